// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: CORS header, error capture, request tracing
pub mod status;

pub use status::status;
