//! Route-guard decision procedure.
//!
//! No IO. No panics. The authorizer folds a path and an already-resolved
//! principal into an [`AccessDecision`]; callers render that decision as an
//! HTTP response, a redirect, or a test assertion.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::principal::Principal;
use crate::roles::Role;
use crate::routes::{GuardConfig, RouteRequirement, RouteRule, DASHBOARD_PATH, SIGNIN_PATH, SIGNUP_PATH};

// ─────────────────────────────────────────────────────────────────────────────
// Decision types
// ─────────────────────────────────────────────────────────────────────────────

/// Why access was denied when the caller is sent to the dashboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeniedReason {
    /// The caller's role does not satisfy the route's requirement.
    InsufficientPermissions,
}

impl DeniedReason {
    /// Stable code carried in redirect query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            DeniedReason::InsufficientPermissions => "insufficient-permissions",
        }
    }
}

impl fmt::Display for DeniedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Serve the request.
    Allow,
    /// Send the caller to sign-in, remembering where they were headed.
    /// `callback` is the original path, not yet URL-encoded.
    ToSignin { callback: String },
    /// Send the caller to the dashboard. `error` is set when this is a
    /// denial rather than a bounce off the auth pages.
    ToDashboard { error: Option<DeniedReason> },
}

/// Full trace of one evaluation, for introspection endpoints and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTrace {
    pub path: String,
    pub public: bool,
    pub matched_rule: Option<RouteRule>,
    pub decision: AccessDecision,
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorizer
// ─────────────────────────────────────────────────────────────────────────────

/// Stateless evaluator over immutable guard tables.
#[derive(Debug, Clone, Default)]
pub struct RouteAuthorizer {
    config: GuardConfig,
}

impl RouteAuthorizer {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decide access for `path` given the resolved caller, if any.
    ///
    /// Checks run in a fixed order: public classification, authentication,
    /// then the role requirement. Two consequences worth calling out:
    /// an authenticated caller on exactly the sign-in or sign-up page is
    /// bounced to the dashboard, and a signed-in caller on a path with no
    /// rule is allowed through on authentication alone.
    pub fn decide(&self, path: &str, principal: Option<&Principal>) -> AccessDecision {
        if self.config.is_public(path) {
            // The auth pages themselves: signed-in callers have no business
            // there. Exact match only; nested paths under them stay public.
            if principal.is_some() && (path == SIGNIN_PATH || path == SIGNUP_PATH) {
                return AccessDecision::ToDashboard { error: None };
            }
            return AccessDecision::Allow;
        }

        let Some(principal) = principal else {
            return AccessDecision::ToSignin {
                callback: path.to_string(),
            };
        };

        match self.config.requirement_for(path) {
            Some(RouteRequirement::AdminOnly) => {
                if matches!(principal.role, Role::Admin | Role::Superadmin) {
                    AccessDecision::Allow
                } else {
                    AccessDecision::ToDashboard {
                        error: Some(DeniedReason::InsufficientPermissions),
                    }
                }
            }
            Some(RouteRequirement::MinimumRole(required)) => {
                if principal.role.outranks_or_equal(required) {
                    AccessDecision::Allow
                } else {
                    AccessDecision::ToDashboard {
                        error: Some(DeniedReason::InsufficientPermissions),
                    }
                }
            }
            None => AccessDecision::Allow,
        }
    }

    /// [`Self::decide`] plus the intermediate lookups that produced it.
    pub fn explain(&self, path: &str, principal: Option<&Principal>) -> DecisionTrace {
        DecisionTrace {
            path: path.to_string(),
            public: self.config.is_public(path),
            matched_rule: self.config.rule_for(path).cloned(),
            decision: self.decide(path, principal),
        }
    }

    /// Redirect target for a decision, or `None` for [`AccessDecision::Allow`].
    ///
    /// The callback is percent-encoded the way browsers expect; the denial
    /// code rides in the `error` query parameter.
    pub fn redirect_target(decision: &AccessDecision) -> Option<String> {
        match decision {
            AccessDecision::Allow => None,
            AccessDecision::ToSignin { callback } => Some(format!(
                "{SIGNIN_PATH}?callbackUrl={}",
                urlencoding::encode(callback)
            )),
            AccessDecision::ToDashboard { error: None } => Some(DASHBOARD_PATH.to_string()),
            AccessDecision::ToDashboard { error: Some(reason) } => {
                Some(format!("{DASHBOARD_PATH}?error={reason}"))
            }
        }
    }
}
