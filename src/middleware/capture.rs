use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Destination for failures that reached the top of a request.
/// Reporting never fails and never alters the response.
pub trait ErrorReporter: Send + Sync {
    fn capture(&self, error: &ApiError);
}

/// Reports failures as structured `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, error: &ApiError) {
        let status = error.status_code().as_u16();
        if error.status_code().is_server_error() {
            tracing::error!(status, error = %error, "Request failed");
        } else {
            tracing::warn!(status, error = %error, "Request rejected");
        }
    }
}

/// Hand every `ApiError` response to the reporter, once, on its way out.
pub async fn capture_errors(
    State(reporter): State<Arc<dyn ErrorReporter>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if let Some(error) = response.extensions().get::<ApiError>() {
        reporter.capture(error);
    }
    response
}
