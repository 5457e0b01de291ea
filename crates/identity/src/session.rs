//! Session records.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rolegate_policy::Principal;

/// Default session lifetime when none is configured.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60;

/// Opaque bearer token identifying a live session.
///
/// A random 128-bit value. It carries no claims and cannot be introspected
/// offline; possession is the whole credential, so it stays out of logs.
/// `Debug` is redacted for the same reason.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

impl From<&str> for SessionToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A live authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub token: SessionToken,
    pub principal: Principal,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Open a fresh session for `principal` lasting `ttl_secs`.
    pub fn issue(principal: Principal, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            token: SessionToken::generate(),
            principal,
            issued_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
