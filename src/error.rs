// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use crate::database::DatabaseError;

const CORRUPT_AUTHORIZER_DATA: &str = "Corrupt authorizer data. Contact support.";

/// Every failure a handler can report. Each kind carries a fixed status code;
/// the rendered body is always `{message, details}`.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("invalid request data: {0:?}")]
    InvalidRequestData(Vec<String>),

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("invalid date: {0:?}")]
    InvalidDate(Option<String>),

    /// Conflicting create. Reported as 400 rather than 409.
    #[error("duplicate item: {0}")]
    DuplicateItem(String),

    // 401 Unauthorized
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    // 403 Forbidden
    #[error("missing scope {required_scope}")]
    Forbidden { required_scope: String },

    // 404 Not Found, also used when the caller lacks access
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    // 405 Method Not Allowed
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    // 500 Internal Server Error
    #[error("missing authorizer data")]
    MissingAuthorizerData,

    #[error("missing user id in authorizer data")]
    MissingUserId,

    #[error("missing workspace id in authorizer data")]
    MissingWorkspaceId,

    #[error("upstream failure: {0}")]
    UpstreamFailure(String),
}

/// `details` is a single sentence for most errors and a list for validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub details: ErrorDetails,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequestData(_)
            | ApiError::InvalidJson(_)
            | ApiError::InvalidCursor
            | ApiError::InvalidLimit(_)
            | ApiError::InvalidDate(_)
            | ApiError::DuplicateItem(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingAuthorizerData
            | ApiError::MissingUserId
            | ApiError::MissingWorkspaceId
            | ApiError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidRequestData(_) | ApiError::InvalidLimit(_) => "Invalid request data",
            ApiError::InvalidJson(_) => "Invalid JSON",
            ApiError::InvalidCursor => "Invalid cursor",
            ApiError::InvalidDate(_) => "Invalid Date Format",
            ApiError::DuplicateItem(_) => "Duplicate item",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden { .. } => "Forbidden",
            ApiError::NotFound { .. } => "Not Found",
            ApiError::MethodNotAllowed(_) => "Method Not Allowed",
            ApiError::MissingAuthorizerData => "Missing authorizer data",
            ApiError::MissingUserId => "Missing user id",
            ApiError::MissingWorkspaceId => "Missing workspace id",
            ApiError::UpstreamFailure(_) => "Internal Server Error",
        }
    }

    /// Client-safe details. Never includes internal causes.
    pub fn details(&self) -> ErrorDetails {
        match self {
            ApiError::InvalidRequestData(violations) => ErrorDetails::List(violations.clone()),
            ApiError::InvalidLimit(_) => {
                ErrorDetails::List(vec!["\"limit\" must be a positive integer".to_string()])
            }
            ApiError::InvalidJson(_) => ErrorDetails::Text("The request body must be valid JSON".to_string()),
            ApiError::InvalidCursor => {
                ErrorDetails::Text("Use the cursor returned by the previous page".to_string())
            }
            ApiError::InvalidDate(_) => ErrorDetails::Text(
                "The valid date format is \"YYYY-MM-DD\", for example \"2020-01-28\"".to_string(),
            ),
            ApiError::DuplicateItem(_) => ErrorDetails::Text("An item with this id already exists".to_string()),
            ApiError::Unauthorized(reason) => ErrorDetails::Text(reason.clone()),
            ApiError::Forbidden { required_scope } => {
                ErrorDetails::Text(format!("You need scope \"{}\"", required_scope))
            }
            ApiError::NotFound { resource } => ErrorDetails::Text(format!(
                "You might not have access to this {}, or it doesn't exist.",
                resource
            )),
            ApiError::MethodNotAllowed(method) => {
                ErrorDetails::Text(format!("{} is not supported on this resource", method))
            }
            ApiError::MissingAuthorizerData | ApiError::MissingUserId | ApiError::MissingWorkspaceId => {
                ErrorDetails::Text(CORRUPT_AUTHORIZER_DATA.to_string())
            }
            ApiError::UpstreamFailure(_) => {
                ErrorDetails::Text("Something went wrong, please try again later".to_string())
            }
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message().to_string(),
            details: self.details(),
        }
    }

    pub fn forbidden(required_scope: impl Into<String>) -> Self {
        ApiError::Forbidden {
            required_scope: required_scope.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        ApiError::NotFound { resource }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateItem(msg) => ApiError::DuplicateItem(msg),
            DatabaseError::ConditionalCheckFailed { pk, sk } => {
                ApiError::DuplicateItem(format!("{} already exists in {}", sk, pk))
            }
            other => ApiError::UpstreamFailure(other.to_string()),
        }
    }
}

// Automatic HTTP response conversion for Axum. The error itself rides along in
// the response extensions so the capture layer can report it.
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code(), Json(self.to_body())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
