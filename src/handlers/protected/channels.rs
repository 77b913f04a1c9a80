use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query, State,
    },
};

use crate::api::format::PageBody;
use crate::app::AppState;
use crate::auth::Authorizer;
use crate::database::models::{Channel, Recording};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validators::{validate_authorizer_data, validate_channel, validate_scope};

use super::utils::{page_request, parse_body, path_param, query_params, PageQuery};

/// POST /channels - Create a channel in the caller's workspace
pub async fn create_channel(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    body: Bytes,
) -> ApiResult<Channel> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.create_channel)?;

    let payload = parse_body(&body)?;
    let new_channel = validate_channel(Some(&payload))?;

    let channel = state
        .channels
        .create(&caller.workspace_id, &caller.user_id, new_channel.name)
        .await?;
    Ok(ApiResponse::created(channel))
}

/// GET /channels - List the workspace's channels
pub async fn get_channels(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<PageBody<Channel>> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_channels)?;
    let query = query_params(query)?;
    let page = page_request(&query, &state.config.api)?;

    let channels = state.channels.get_all(&caller.workspace_id, page).await?;
    Ok(ApiResponse::success(PageBody::from(channels)))
}

/// GET /channels/:channel_id
pub async fn get_channel(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Channel> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_channel)?;
    let channel_id = path_param(path)?;

    let channel = state
        .channels
        .get(&caller.workspace_id, &channel_id)
        .await?
        .ok_or_else(|| ApiError::not_found("channel"))?;
    Ok(ApiResponse::success(channel))
}

/// GET /channels/:channel_id/recordings - Most recent first
pub async fn get_channel_recordings(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<PageBody<Recording>> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_channel_recordings)?;
    let channel_id = path_param(path)?;
    let query = query_params(query)?;
    let page = page_request(&query, &state.config.api)?;

    let recordings = state
        .recordings
        .get_all(&caller.workspace_id, &channel_id, page)
        .await?;
    Ok(ApiResponse::success(PageBody::from(recordings)))
}
