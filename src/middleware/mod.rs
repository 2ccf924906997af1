mod auth;

pub use auth::{identity_from_request, AccessClaims, JwtService};
