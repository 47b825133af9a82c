//! Permission checks over a time-bounded cache of the role graph.

pub mod authorizer;

pub use authorizer::PermissionAuthorizer;
