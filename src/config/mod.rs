use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub scopes: ScopeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub table_name: String,
    pub index_name: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub default_page_limit: u32,
    pub max_page_limit: u32,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_allow_origin: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Scope each endpoint requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub create_channel: String,
    pub read_channels: String,
    pub read_channel: String,
    pub read_channel_recordings: String,
    pub create_standup: String,
    pub read_standups: String,
    pub read_standup: String,
    pub read_updates: String,
    pub read_members: String,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            create_channel: "create:channel".to_string(),
            read_channels: "read:channels".to_string(),
            read_channel: "read:channel".to_string(),
            read_channel_recordings: "read:channel-recordings".to_string(),
            create_standup: "create:standup".to_string(),
            read_standups: "read:standups".to_string(),
            read_standup: "read:standup".to_string(),
            read_updates: "read:updates".to_string(),
            read_members: "read:members".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("DATABASE_URL must be set when STORAGE_BACKEND=postgres")]
    MissingDatabaseUrl,
    #[error("DEFAULT_PAGE_LIMIT must be between 1 and MAX_PAGE_LIMIT ({0})")]
    InvalidPageLimit(u32),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.storage.backend = StorageBackend::Memory,
                "postgres" | "postgresql" => self.storage.backend = StorageBackend::Postgres,
                other => tracing::warn!("Ignoring unknown STORAGE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.storage.database_url = Some(v);
        }
        if let Ok(v) = env::var("DYNAMODB_TABLE_NAME").or_else(|_| env::var("TABLE_NAME")) {
            self.storage.table_name = v;
        }
        if let Ok(v) = env::var("INDEX_NAME") {
            self.storage.index_name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.storage.max_connections = v.parse().unwrap_or(self.storage.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.storage.connection_timeout = v.parse().unwrap_or(self.storage.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("DEFAULT_PAGE_LIMIT") {
            self.api.default_page_limit = v.parse().unwrap_or(self.api.default_page_limit);
        }
        if let Ok(v) = env::var("MAX_PAGE_LIMIT") {
            self.api.max_page_limit = v.parse().unwrap_or(self.api.max_page_limit);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("CORS_ALLOW_ORIGIN") {
            self.security.cors_allow_origin = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Scope overrides
        let scopes = &mut self.scopes;
        for (var, slot) in [
            ("CREATE_CHANNEL_SCOPE", &mut scopes.create_channel),
            ("READ_CHANNELS_SCOPE", &mut scopes.read_channels),
            ("READ_CHANNEL_SCOPE", &mut scopes.read_channel),
            ("READ_CHANNEL_RECORDINGS_SCOPE", &mut scopes.read_channel_recordings),
            ("CREATE_STANDUP_SCOPE", &mut scopes.create_standup),
            ("READ_STANDUPS_SCOPE", &mut scopes.read_standups),
            ("READ_STANDUP_SCOPE", &mut scopes.read_standup),
            ("READ_UPDATES_SCOPE", &mut scopes.read_updates),
            ("READ_MEMBERS_SCOPE", &mut scopes.read_members),
        ] {
            if let Ok(v) = env::var(var) {
                *slot = v;
            }
        }

        self
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.api.default_page_limit == 0 || self.api.default_page_limit > self.api.max_page_limit {
            return Err(ConfigError::InvalidPageLimit(self.api.max_page_limit));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database_url: None,
                table_name: "standups".to_string(),
                index_name: "standups_inverted_idx".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 20,
                max_page_limit: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                cors_allow_origin: "*".to_string(),
                jwt_secret: "development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            scopes: ScopeConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
                database_url: None,
                table_name: "standups".to_string(),
                index_name: "standups_inverted_idx".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 20,
                max_page_limit: 100,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                cors_allow_origin: "https://staging.example.com".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            scopes: ScopeConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            storage: StorageConfig {
                backend: StorageBackend::Postgres,
                database_url: None,
                table_name: "standups".to_string(),
                index_name: "standups_inverted_idx".to_string(),
                max_connections: 20,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                default_page_limit: 20,
                max_page_limit: 100,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                cors_allow_origin: "https://app.example.com".to_string(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            scopes: ScopeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.api.default_page_limit, 20);
        assert_eq!(config.scopes.create_channel, "create:channel");
        assert_eq!(config.scopes.read_channel_recordings, "read:channel-recordings");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(!config.api.enable_request_logging);
        // Secrets and database location must come from the environment.
        assert!(matches!(config.validate(), Err(ConfigError::MissingJwtSecret)));
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let mut config = AppConfig::production();
        config.security.jwt_secret = "s3cret".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingDatabaseUrl)));

        config.storage.database_url = Some("postgres://localhost/standups".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_page_limits_must_be_consistent() {
        let mut config = AppConfig::development();
        config.api.default_page_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPageLimit(100))));

        config.api.default_page_limit = 101;
        assert!(config.validate().is_err());
    }
}
