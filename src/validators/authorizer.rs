use crate::auth::Authorizer;
use crate::error::ApiError;

/// Identity of the caller after the authorizer context has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub workspace_id: String,
    pub scope: Option<String>,
}

/// Check the authorizer context attached upstream.
///
/// The context is produced by a trusted component, so anything missing here
/// is a server-side misconfiguration and maps to a 500, not a client error.
pub fn validate_authorizer_data(authorizer: Option<&Authorizer>) -> Result<Caller, ApiError> {
    let authorizer = authorizer.ok_or(ApiError::MissingAuthorizerData)?;

    let user_id = present(&authorizer.user_id).ok_or(ApiError::MissingUserId)?;
    let workspace_id = present(&authorizer.workspace_id).ok_or(ApiError::MissingWorkspaceId)?;

    Ok(Caller {
        user_id: user_id.to_string(),
        workspace_id: workspace_id.to_string(),
        scope: authorizer.scope.clone(),
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
