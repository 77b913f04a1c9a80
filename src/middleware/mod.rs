pub mod auth;
pub mod capture;
pub mod response;

pub use auth::jwt_auth_middleware;
pub use capture::{capture_errors, ErrorReporter, TracingReporter};
pub use response::{ApiResponse, ApiResult};
