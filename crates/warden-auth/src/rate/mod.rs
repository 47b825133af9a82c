//! Per-key counters bounded by a TTL window.

pub mod guard;

pub use guard::{RateGuard, RatePolicy};
