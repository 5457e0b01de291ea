//! Auth-state change notifications.
//!
//! There is no ambient global listener. Interested parties call
//! [`crate::IdentityProvider::subscribe`] and hold the receiver for as long
//! as they care; dropping it is the unsubscribe. Delivery is lossy broadcast
//! with no backpressure on the provider.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rolegate_policy::{Principal, PrincipalId, Role};

/// Broadcast whenever a session opens or closes, or an account's
/// guard-relevant state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedIn {
        principal: Principal,
        at: DateTime<Utc>,
    },
    SignedOut {
        principal_id: PrincipalId,
        at: DateTime<Utc>,
    },
    ProfileUpdated {
        principal_id: PrincipalId,
        at: DateTime<Utc>,
    },
    RoleAssigned {
        principal_id: PrincipalId,
        role: Role,
        at: DateTime<Utc>,
    },
    ActivationChanged {
        principal_id: PrincipalId,
        is_active: bool,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    pub fn signed_in(principal: Principal) -> Self {
        Self::SignedIn {
            principal,
            at: Utc::now(),
        }
    }

    pub fn signed_out(principal_id: PrincipalId) -> Self {
        Self::SignedOut {
            principal_id,
            at: Utc::now(),
        }
    }

    pub fn profile_updated(principal_id: PrincipalId) -> Self {
        Self::ProfileUpdated {
            principal_id,
            at: Utc::now(),
        }
    }

    pub fn role_assigned(principal_id: PrincipalId, role: Role) -> Self {
        Self::RoleAssigned {
            principal_id,
            role,
            at: Utc::now(),
        }
    }

    pub fn activation_changed(principal_id: PrincipalId, is_active: bool) -> Self {
        Self::ActivationChanged {
            principal_id,
            is_active,
            at: Utc::now(),
        }
    }

    /// Event name as published on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn { .. } => "signed_in",
            AuthEvent::SignedOut { .. } => "signed_out",
            AuthEvent::ProfileUpdated { .. } => "profile_updated",
            AuthEvent::RoleAssigned { .. } => "role_assigned",
            AuthEvent::ActivationChanged { .. } => "activation_changed",
        }
    }
}
