use crate::error::ApiError;

/// Require `required_scope` to be one of the whitespace-separated tokens in
/// `scope`. Matching is exact and case-sensitive.
pub fn validate_scope(scope: Option<&str>, required_scope: &str) -> Result<(), ApiError> {
    let authorized = scope
        .map(|scope| scope.split_whitespace().any(|token| token == required_scope))
        .unwrap_or(false);

    if !authorized {
        return Err(ApiError::forbidden(required_scope));
    }
    Ok(())
}
