//! The identity-provider interface.
//!
//! One trait, no backend assumptions. The HTTP layer and the route guard are
//! written against this; swapping the in-memory implementation for a hosted
//! provider is a wiring change, not a rewrite.

use tokio::sync::broadcast;

use rolegate_policy::{Principal, PrincipalId, Role};

use crate::error::IdentityResult;
use crate::events::AuthEvent;
use crate::profile::{NewAccount, ProfileUpdate, UserProfile, UserQuery};
use crate::session::{AuthSession, SessionToken};

/// Async interface to whatever backs accounts and sessions.
///
/// Implementations validate input with [`crate::validate`] before touching
/// storage and must keep backend detail out of error values. Credential
/// failures stay deliberately coarse.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account plus its profile record.
    ///
    /// The email is normalized to lowercase and the stored name is composed
    /// from the two required name parts. A missing role becomes the default
    /// role; an explicitly unknown role label never reaches this method,
    /// since labels are typed away at the boundary.
    async fn register(&self, account: NewAccount) -> IdentityResult<UserProfile>;

    /// Verify credentials against an active account and open a session.
    /// Also stamps the account's `last_login`.
    async fn login(&self, email: &str, password: &str) -> IdentityResult<AuthSession>;

    /// Close the session behind `token`. Unknown or already-expired tokens
    /// are a no-op, not an error.
    async fn logout(&self, token: &SessionToken) -> IdentityResult<()>;

    /// The principal behind a live session, or `None` when the token is
    /// unknown, expired, or revoked.
    async fn resolve(&self, token: &SessionToken) -> IdentityResult<Option<Principal>>;

    /// Full profile for a principal.
    async fn profile(&self, id: PrincipalId) -> IdentityResult<UserProfile>;

    /// Apply a partial update and return the fresh record.
    async fn update_profile(
        &self,
        id: PrincipalId,
        update: ProfileUpdate,
    ) -> IdentityResult<UserProfile>;

    /// Re-verify the current password, then replace it. Live sessions stay
    /// valid.
    async fn change_password(
        &self,
        id: PrincipalId,
        current: &str,
        new: &str,
    ) -> IdentityResult<()>;

    /// Move a principal to `role` and return the fresh record.
    async fn assign_role(&self, id: PrincipalId, role: Role) -> IdentityResult<UserProfile>;

    /// Enable or disable sign-in for an account. Disabling also revokes the
    /// account's live sessions.
    async fn set_active(&self, id: PrincipalId, active: bool) -> IdentityResult<UserProfile>;

    /// Profiles matching `query`, newest first. Paging follows
    /// [`UserQuery::page_size`]: without paging parameters the full result
    /// comes back.
    async fn list_users(&self, query: UserQuery) -> IdentityResult<Vec<UserProfile>>;

    /// Subscribe to auth-state changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
