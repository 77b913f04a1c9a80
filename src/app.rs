//! HTTP application wiring.
//!
//! Builds the axum router, applies the middleware stack and defines the
//! state injected into handlers. Everything a handler needs is constructed
//! here from an explicit storage backend.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::{KeyValueStore, StorageService};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{capture_errors, jwt_auth_middleware, ErrorReporter};
use crate::services::{ChannelService, RecordingService, StandupService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: StorageService,
    pub channels: ChannelService,
    pub recordings: RecordingService,
    pub standups: StandupService,
    pub reporter: Arc<dyn ErrorReporter>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>, reporter: Arc<dyn ErrorReporter>) -> Self {
        let storage = StorageService::new(store);
        Self {
            config: Arc::new(config),
            channels: ChannelService::new(storage.clone()),
            recordings: RecordingService::new(storage.clone()),
            standups: StandupService::new(storage.clone()),
            storage,
            reporter,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let allow_origin = HeaderValue::from_str(&state.config.security.cors_allow_origin).unwrap_or_else(|_| {
        tracing::warn!(
            "CORS_ALLOW_ORIGIN '{}' is not a valid header value, using '*'",
            state.config.security.cors_allow_origin
        );
        HeaderValue::from_static("*")
    });

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(route_not_found);

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
        .layer(from_fn_with_state(state.reporter.clone(), capture_errors))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allow_origin,
        ))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new().route("/status", get(public::status).fallback(method_not_allowed))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{channels, standups};

    Router::new()
        .route(
            "/channels",
            get(channels::get_channels)
                .post(channels::create_channel)
                .fallback(method_not_allowed),
        )
        .route("/channels/:channel_id", get(channels::get_channel).fallback(method_not_allowed))
        .route(
            "/channels/:channel_id/recordings",
            get(channels::get_channel_recordings).fallback(method_not_allowed),
        )
        .route(
            "/standups",
            get(standups::get_standups)
                .post(standups::create_standup)
                .fallback(method_not_allowed),
        )
        .route("/standups/:standup_id", get(standups::get_standup).fallback(method_not_allowed))
        .route(
            "/standups/:standup_id/updates",
            get(standups::get_standup_updates).fallback(method_not_allowed),
        )
        .route(
            "/standups/:standup_id/members",
            get(standups::get_standup_members).fallback(method_not_allowed),
        )
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("resource")
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
