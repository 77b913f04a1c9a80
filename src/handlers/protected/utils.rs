use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query,
    },
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::page_cursor;
use crate::config::ApiConfig;
use crate::database::PageRequest;
use crate::error::ApiError;

/// Query string of the paginated listings. Values stay raw strings so bad
/// input is reported in the API's own error shape.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Unwrap an extracted query string, reporting a malformed one in the API's
/// error shape.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        ApiError::InvalidRequestData(vec![rejection.body_text()])
    })
}

pub fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    path.map(|Path(param)| param).map_err(|rejection| {
        tracing::debug!("Rejected path parameter: {}", rejection.body_text());
        ApiError::InvalidRequestData(vec![rejection.body_text()])
    })
}

/// Resolve `limit` and `cursor` into a page request.
pub fn page_request(query: &PageQuery, api: &ApiConfig) -> Result<PageRequest, ApiError> {
    let limit = parse_limit(query.limit.as_deref(), api.default_page_limit, api.max_page_limit)?;
    let start_key = page_cursor::decode(query.cursor.as_deref())?;
    Ok(PageRequest::new(limit, start_key))
}

/// A positive integer, clamped to `max`. Absent or empty means `default`.
pub fn parse_limit(raw: Option<&str>, default: u32, max: u32) -> Result<u32, ApiError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };

    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidLimit(raw.to_string()));
    }
    // All digits: anything too large for u64 is still just "more than max".
    let value = raw.parse::<u64>().unwrap_or(u64::MAX);
    if value == 0 {
        return Err(ApiError::InvalidLimit(raw.to_string()));
    }
    Ok(value.min(u64::from(max)) as u32)
}

/// Parse a raw request body as JSON. An empty body reads as `{}`.
pub fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))
}
