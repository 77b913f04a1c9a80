// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: JWT authentication, then a per-endpoint scope
// Middleware: jwt_auth_middleware attaches the authorizer context
//
// Every handler runs the same steps: authorizer data, scope, body (writes),
// limit and cursor (listings), domain service, response shaping.
pub mod channels;
pub mod standups;
pub mod utils;
