//! Policy error model.

use thiserror::Error;

/// A role label outside the closed set.
///
/// Raised wherever an untrusted string is promoted to a [`crate::Role`]:
/// request payloads, stored profile rows, guard configuration. Holders of a
/// typed `Role` never see this error. Callers must treat it as a denial,
/// never as a fallback to some default role.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: '{0}'")]
pub struct UnknownRole(String);

impl UnknownRole {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The rejected label, for diagnostics.
    pub fn label(&self) -> &str {
        &self.0
    }
}
