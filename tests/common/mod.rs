#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use standups_api::app::{build_router, AppState};
use standups_api::auth::{generate_jwt, Claims};
use standups_api::config::AppConfig;
use standups_api::database::store::memory::MemoryStore;
use standups_api::database::StorageService;
use standups_api::error::ApiError;
use standups_api::middleware::ErrorReporter;

pub const SECRET: &str = "integration-secret";

pub const ALL_SCOPES: &str = "create:channel read:channels read:channel read:channel-recordings \
     create:standup read:standups read:standup read:updates read:members";

/// Collects every captured error message.
#[derive(Default)]
pub struct RecordingReporter(Mutex<Vec<String>>);

impl RecordingReporter {
    pub fn captured(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn capture(&self, error: &ApiError) {
        self.0.lock().unwrap().push(error.message().to_string());
    }
}

/// Router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub storage: StorageService,
    pub reporter: Arc<RecordingReporter>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.security.cors_allow_origin = "https://app.example.com".to_string();
        config.api.enable_request_logging = false;

        let store = Arc::new(MemoryStore::new());
        let reporter = Arc::new(RecordingReporter::default());
        let state = AppState::new(config, store.clone(), reporter.clone());

        Self {
            router: build_router(state),
            storage: StorageService::new(store),
            reporter,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body)?).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: &str) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }
}

/// Token for `user_id` in `workspace_id` with the given scopes.
/// Percent-encode a value for use in a query string.
pub fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn token(user_id: &str, workspace_id: &str, scope: &str) -> String {
    let claims = Claims::new(
        Some(user_id.to_string()),
        Some(workspace_id.to_string()),
        Some(scope.to_string()),
        1,
    );
    generate_jwt(&claims, SECRET).expect("token")
}

pub fn token_from(claims: Claims) -> String {
    generate_jwt(&claims, SECRET).expect("token")
}

/// The built binary running on its own port with in-memory storage.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_standups-api"))
            .arg("serve")
            .env("APP_ENV", "development")
            .env("STORAGE_BACKEND", "memory")
            .env("PORT", port.to_string())
            .env("JWT_SECRET", SECRET)
            .env("CORS_ALLOW_ORIGIN", "*")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/status", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
