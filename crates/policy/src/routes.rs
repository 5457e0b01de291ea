//! Route-guard tables.
//!
//! Two small, ordered tables drive the guard: paths that are public, and
//! paths that carry an authorization requirement. Both are loaded once at
//! startup and never mutated; lookups are linear scans over a handful of
//! entries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::Role;

/// Where unauthenticated callers are sent.
pub const SIGNIN_PATH: &str = "/auth/signin";
/// Companion auth page; authenticated callers are bounced off it too.
pub const SIGNUP_PATH: &str = "/auth/signup";
/// Landing page for authenticated callers and for denied ones.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Authorization requirement attached to a route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRequirement {
    /// Admin or superadmin only.
    AdminOnly,
    /// This role or any role that outranks it.
    MinimumRole(Role),
}

/// One entry of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub path: String,
    pub requirement: RouteRequirement,
}

impl RouteRule {
    pub fn new(path: impl Into<String>, requirement: RouteRequirement) -> Self {
        Self {
            path: path.into(),
            requirement,
        }
    }
}

/// Rejected guard configuration.
#[derive(Debug, Error)]
pub enum GuardConfigError {
    /// Malformed JSON or a role label outside the closed set.
    #[error("invalid guard config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("route path must start with '/': '{0}'")]
    BadPath(String),
}

/// The guard's complete route policy.
///
/// Matching semantics, used for both tables: a path matches an entry when it
/// is equal to it, or when it starts with the entry plus `/`. The root entry
/// `/` therefore matches only itself, never every path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Reachable without authentication.
    pub public_routes: Vec<String>,
    /// Ordered requirement table; exact path match wins over prefix match,
    /// and among prefix matches the earliest entry wins.
    pub rules: Vec<RouteRule>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            public_routes: vec![
                "/".to_string(),
                SIGNIN_PATH.to_string(),
                SIGNUP_PATH.to_string(),
                "/auth/error".to_string(),
            ],
            rules: vec![
                RouteRule::new("/admin", RouteRequirement::AdminOnly),
                RouteRule::new(DASHBOARD_PATH, RouteRequirement::MinimumRole(Role::User)),
                RouteRule::new("/profile", RouteRequirement::MinimumRole(Role::User)),
            ],
        }
    }
}

impl GuardConfig {
    /// Parse and validate a JSON config. Unknown role labels are rejected
    /// here, at startup, rather than surfacing mid-request.
    pub fn from_json(raw: &str) -> Result<Self, GuardConfigError> {
        let config: GuardConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), GuardConfigError> {
        for path in self
            .public_routes
            .iter()
            .chain(self.rules.iter().map(|r| &r.path))
        {
            if !path.starts_with('/') {
                return Err(GuardConfigError::BadPath(path.clone()));
            }
        }
        Ok(())
    }

    /// True when `path` is reachable without authentication.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes.iter().any(|route| path_matches(route, path))
    }

    /// The rule governing `path`, if any.
    ///
    /// Exact matches are tried across the whole table first, so an exact
    /// entry beats an earlier prefix entry regardless of ordering. Only then
    /// does the prefix scan run, in table order.
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        self.rules
            .iter()
            .find(|rule| rule.path == path)
            .or_else(|| self.rules.iter().find(|rule| path_matches(&rule.path, path)))
    }

    /// The requirement governing `path`, if any.
    pub fn requirement_for(&self, path: &str) -> Option<RouteRequirement> {
        self.rule_for(path).map(|rule| rule.requirement)
    }
}

/// Equal, or nested one segment boundary below. Equivalent to
/// `path == route || path.starts_with(route + "/")` without the allocation.
pub(crate) fn path_matches(route: &str, path: &str) -> bool {
    path == route || (path.starts_with(route) && path[route.len()..].starts_with('/'))
}
