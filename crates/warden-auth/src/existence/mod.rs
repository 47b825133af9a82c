//! Handle existence: probabilistic filter, confirming cache, durable store.

pub mod bloom;
pub mod index;

pub use bloom::{BloomFilter, MembershipFilter};
pub use index::ExistenceIndex;
