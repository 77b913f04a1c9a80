// handlers/mod.rs - two security tiers
//
// Public (no token) → Protected (bearer token, authorizer context, scope check)
pub mod public;
pub mod protected;
