//! Identity error model.

use thiserror::Error;

use rolegate_policy::UnknownRole;

/// Result type used across the identity layer.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Input rejected at the boundary, before any provider work.
///
/// Messages are user-facing and surface verbatim in HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Email, password, first name, and last name are required")]
    MissingRegistrationFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
}

/// Identity-provider failure.
///
/// Credential failures are deliberately coarse: a caller cannot tell a wrong
/// password from a nonexistent account. Backend details never leak; whatever
/// the provider reports internally collapses into [`IdentityError::Provider`]
/// with an operator-facing message.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A role label outside the closed set. Rejected, never defaulted.
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),

    /// Registration against an email that already has an account.
    #[error("Email is already registered")]
    EmailTaken,

    /// Credentials did not match an account.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Credentials matched, but the account is disabled or its profile row
    /// is missing.
    #[error("Account is inactive or not found")]
    AccountInactive,

    /// Password change where the presented current password is wrong.
    #[error("Current password is incorrect")]
    PasswordMismatch,

    /// Lookup of a principal that does not exist.
    #[error("Account not found")]
    NotFound,

    /// Anything that went wrong inside the provider itself.
    #[error("identity provider failure: {0}")]
    Provider(String),
}

impl IdentityError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
