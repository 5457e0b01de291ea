//! `rolegate-policy` — pure role and route-authorization policy.
//!
//! Everything in this crate is deterministic and IO-free: role ranking,
//! the capability table, and the route-guard decision procedure. HTTP
//! rendering and identity lookups live elsewhere and feed their results in.

pub mod authorizer;
pub mod error;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod routes;

pub use authorizer::{AccessDecision, DeniedReason, RouteAuthorizer};
pub use error::UnknownRole;
pub use permissions::PermissionSet;
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
pub use routes::{GuardConfig, GuardConfigError, RouteRequirement, RouteRule};
