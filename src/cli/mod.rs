use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::app::{build_router, AppState};
use crate::auth::{generate_jwt, Claims};
use crate::config::{AppConfig, StorageBackend};
use crate::database::store::{memory::MemoryStore, postgres::PostgresStore};
use crate::database::KeyValueStore;
use crate::middleware::TracingReporter;

#[derive(Parser)]
#[command(name = "standups-api")]
#[command(about = "Standups API - channels, recordings and standups over a key-value table")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Print a signed access token for local development")]
    Token {
        #[arg(long, help = "User id claim")]
        user_id: String,
        #[arg(long, help = "Workspace id claim")]
        workspace_id: String,
        #[arg(long, default_value = "", help = "Space-separated scopes")]
        scope: String,
        #[arg(long, help = "Lifetime in hours, overrides JWT_EXPIRY_HOURS")]
        hours: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Token {
            user_id,
            workspace_id,
            scope,
            hours,
        } => {
            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
            let scope = Some(scope).filter(|s| !s.trim().is_empty());
            let claims = Claims::new(Some(user_id), Some(workspace_id), scope, hours);
            let token = generate_jwt(&claims, &config.security.jwt_secret)?;

            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => println!("{}", json!({ "token": token, "exp": claims.exp })),
            }
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    config.validate()?;
    tracing::info!(
        "Starting Standups API in {:?} mode with {:?} storage",
        config.environment,
        config.storage.backend
    );

    let store = connect_store(&config).await?;
    let port = port.unwrap_or(config.api.port);
    let state = AppState::new(config, store, Arc::new(TracingReporter));
    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Standups API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Open the configured storage backend.
pub async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgres => Arc::new(
            PostgresStore::connect(&config.storage)
                .await
                .context("failed to open postgres storage")?,
        ),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::parse_from(["standups-api"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["standups-api", "serve", "--port", "8080"]);
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8080) })));
    }

    #[test]
    fn parses_token_arguments() {
        let cli = Cli::parse_from([
            "standups-api",
            "--json",
            "token",
            "--user-id",
            "user|1",
            "--workspace-id",
            "ws1",
            "--scope",
            "read:channels create:channel",
        ]);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Some(Commands::Token {
                user_id,
                workspace_id,
                scope,
                hours,
            }) => {
                assert_eq!(user_id, "user|1");
                assert_eq!(workspace_id, "ws1");
                assert_eq!(scope, "read:channels create:channel");
                assert_eq!(hours, None);
            }
            _ => panic!("expected token command"),
        }
    }
}
