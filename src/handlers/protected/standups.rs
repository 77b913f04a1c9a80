use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query, State,
    },
};

use crate::api::format::{DatedItemsBody, ItemsBody, PageBody};
use crate::app::AppState;
use crate::auth::Authorizer;
use crate::database::models::{Membership, Standup, Update};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validators::{validate_authorizer_data, validate_date, validate_scope, validate_standup};

use super::utils::{page_request, parse_body, path_param, query_params, DateQuery, PageQuery};

/// POST /standups - Create a standup; the caller becomes its first member
pub async fn create_standup(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    body: Bytes,
) -> ApiResult<Standup> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.create_standup)?;

    let payload = parse_body(&body)?;
    let new_standup = validate_standup(Some(&payload))?;

    let standup = state
        .standups
        .create(&caller.workspace_id, &caller.user_id, new_standup.name)
        .await?;
    Ok(ApiResponse::created(standup))
}

/// GET /standups - Standups the caller belongs to
pub async fn get_standups(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<PageBody<Membership>> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_standups)?;
    let query = query_params(query)?;
    let page = page_request(&query, &state.config.api)?;

    let standups = state
        .standups
        .get_all(&caller.workspace_id, &caller.user_id, page)
        .await?;
    Ok(ApiResponse::success(PageBody::from(standups)))
}

/// GET /standups/:standup_id
pub async fn get_standup(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Standup> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_standup)?;
    let standup_id = path_param(path)?;

    let standup = state
        .standups
        .get(&caller.workspace_id, &caller.user_id, &standup_id)
        .await?
        .ok_or_else(|| ApiError::not_found("standup"))?;
    Ok(ApiResponse::success(standup))
}

/// GET /standups/:standup_id/updates?date=YYYY-MM-DD
pub async fn get_standup_updates(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> ApiResult<DatedItemsBody<Update>> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_updates)?;
    let standup_id = path_param(path)?;
    // A repeated or undecodable `date` is a bad date, not a bad request.
    let query = query_params(query).map_err(|_| ApiError::InvalidDate(None))?;
    let date = validate_date(query.date.as_deref())?;

    let items = state
        .standups
        .get_updates(&caller.workspace_id, &caller.user_id, &standup_id, date)
        .await?;
    Ok(ApiResponse::success(DatedItemsBody {
        date: date.format("%Y-%m-%d").to_string(),
        items,
    }))
}

/// GET /standups/:standup_id/members
pub async fn get_standup_members(
    State(state): State<AppState>,
    authorizer: Option<Extension<Authorizer>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ItemsBody<Membership>> {
    let caller = validate_authorizer_data(authorizer.as_deref())?;
    validate_scope(caller.scope.as_deref(), &state.config.scopes.read_members)?;
    let standup_id = path_param(path)?;

    let items = state
        .standups
        .get_members(&caller.workspace_id, &caller.user_id, &standup_id)
        .await?;
    Ok(ApiResponse::success(ItemsBody { items }))
}
