//! Bearer token lifecycle: issue, authorize, refresh, revoke.

pub mod bearer;
pub mod service;

pub use bearer::extract_bearer;
pub use service::{IssuedToken, TokenPair, TokenService};
