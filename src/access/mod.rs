// Role registry, scope resolution and per-level creation rules.
pub mod error;
pub mod policy;
pub mod resolver;
pub mod roles;

pub use error::ScopeError;
pub use resolver::{escape_like, resolve_scope, DepthRule, ScopePrefix, ScopeTable};
pub use roles::{RoleEntry, RoleRegistry, RoleScore};
