//! Account records and the requests that shape them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_policy::{Principal, PrincipalId, Role};

/// Full account record as the provider stores it.
///
/// The guard never sees this; it works on the [`Principal`] slice. Everything
/// else here is profile surface for the pages and the admin screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: PrincipalId,
    pub email: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// Free-form UI preferences, opaque to the backend.
    pub preferences: serde_json::Value,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// The slice of this record that route decisions work on.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            display_name: self.display_name.clone(),
        }
    }
}

/// Registration request. Both name parts are required; the stored display
/// name is composed from them. The role is already typed here; label
/// validation happens at the HTTP boundary, and `None` means the default
/// role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
}

impl NewAccount {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// The display name stored on the new profile: `"{first} {last}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.display_name.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.preferences.is_none()
    }
}

/// Listing filter. Results are newest-first. A query with neither `limit`
/// nor `offset` returns every match; `offset` without `limit` pages by
/// [`UserQuery::DEFAULT_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl UserQuery {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    /// Row cap for this query, or `None` when the listing is unpaged.
    pub fn page_size(&self) -> Option<u32> {
        match (self.limit, self.offset) {
            (Some(limit), _) => Some(limit),
            (None, Some(_)) => Some(Self::DEFAULT_PAGE_SIZE),
            (None, None) => None,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}
