pub mod authorizer;
pub mod date;
pub mod schema;
pub mod scope;

pub use authorizer::{validate_authorizer_data, Caller};
pub use date::validate_date;
pub use schema::{validate_channel, validate_standup};
pub use scope::validate_scope;
