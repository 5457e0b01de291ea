//! Boundary validation for credentials.
//!
//! These checks run before any provider call and reject obviously bad input
//! with user-facing messages. They are shape checks, not verification.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Liberal address shape: something, `@`, something, `.`, something, with no
/// whitespace anywhere. Deliverability is the mail system's problem.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// True when `email` looks like an address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// True when `password` meets the length policy.
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Canonical storage and lookup form. Addresses compare case-insensitively,
/// so accounts are keyed on the lowercased form.
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// Login-boundary checks, in order: presence, then address shape. Password
/// length is deliberately not checked here; accounts created under an older
/// policy must still be able to sign in.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Registration-boundary checks: presence of all four fields, address
/// shape, password policy.
pub fn validate_registration(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), ValidationError> {
    if email.is_empty() || password.is_empty() || first_name.is_empty() || last_name.is_empty() {
        return Err(ValidationError::MissingRegistrationFields);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_valid_password(password) {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
