use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct Status {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
}

/// GET /status - Liveness plus a storage round trip
pub async fn status(State(state): State<AppState>) -> ApiResult<Status> {
    state.storage.health_check().await.map_err(|e| {
        tracing::error!("Storage health check failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(Status {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.backend_name(),
    }))
}
