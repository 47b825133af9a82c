//! Single-use, single-active password reset protocol.

pub mod flow;

pub use flow::{PasswordResetFlow, ResetState};
