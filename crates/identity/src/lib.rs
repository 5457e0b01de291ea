//! `rolegate-identity` — the identity-provider boundary.
//!
//! Defines the [`IdentityProvider`] trait the HTTP layer talks to, the
//! account and session types that cross it, and an in-memory implementation
//! used for development and black-box tests. Backends stay swappable: the
//! rest of the system never sees provider internals, only this interface.

pub mod error;
pub mod events;
pub mod memory;
pub mod profile;
pub mod provider;
pub mod session;
pub mod validate;

pub use error::{IdentityError, IdentityResult, ValidationError};
pub use events::AuthEvent;
pub use memory::MemoryIdentityProvider;
pub use profile::{NewAccount, ProfileUpdate, UserProfile, UserQuery};
pub use provider::IdentityProvider;
pub use session::{AuthSession, SessionToken, DEFAULT_SESSION_TTL_SECS};
