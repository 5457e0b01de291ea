//! In-memory identity provider.
//!
//! Backs development servers and black-box tests. Not optimized; every
//! operation takes one coarse lock. Passwords are argon2-hashed even here so
//! the storage discipline matches a real backend.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use rolegate_policy::{Principal, PrincipalId, Role};

use crate::error::{IdentityError, IdentityResult, ValidationError};
use crate::events::AuthEvent;
use crate::profile::{NewAccount, ProfileUpdate, UserProfile, UserQuery};
use crate::provider::IdentityProvider;
use crate::session::{AuthSession, SessionToken, DEFAULT_SESSION_TTL_SECS};
use crate::validate;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
struct StoredAccount {
    profile: UserProfile,
    password_hash: String,
}

/// Sessions store the principal id only; the profile row stays the single
/// source of truth, so role changes and deactivation bite on the next
/// resolve, not at the next login.
#[derive(Debug, Clone)]
struct SessionRecord {
    principal_id: PrincipalId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<PrincipalId, StoredAccount>,
    email_index: HashMap<String, PrincipalId>,
    sessions: HashMap<SessionToken, SessionRecord>,
}

/// In-memory accounts and sessions behind [`IdentityProvider`].
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    state: RwLock<State>,
    events: broadcast::Sender<AuthEvent>,
    ttl_secs: i64,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::with_session_ttl(DEFAULT_SESSION_TTL_SECS)
    }

    pub fn with_session_ttl(ttl_secs: i64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(State::default()),
            events,
            ttl_secs,
        }
    }

    fn read(&self) -> IdentityResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| IdentityError::provider("state lock poisoned"))
    }

    fn write(&self) -> IdentityResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| IdentityError::provider("state lock poisoned"))
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_password(password: &str) -> IdentityResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::provider(format!("password hashing failed: {e}")))
}

fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn register(&self, account: NewAccount) -> IdentityResult<UserProfile> {
        validate::validate_registration(
            &account.email,
            &account.password,
            &account.first_name,
            &account.last_name,
        )?;
        let email = validate::normalize_email(&account.email);
        let password_hash = hash_password(&account.password)?;
        let name = account.full_name();
        let role = account.role.unwrap_or_default();
        let now = Utc::now();

        let mut state = self.write()?;
        if state.email_index.contains_key(&email) {
            return Err(IdentityError::EmailTaken);
        }

        let id = PrincipalId::new();
        let profile = UserProfile {
            id,
            email: email.clone(),
            name: name.clone(),
            first_name: Some(account.first_name),
            last_name: Some(account.last_name),
            role,
            display_name: Some(name),
            bio: None,
            avatar_url: None,
            preferences: serde_json::json!({}),
            last_login: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.email_index.insert(email, id);
        state.accounts.insert(
            id,
            StoredAccount {
                profile: profile.clone(),
                password_hash,
            },
        );
        tracing::info!(principal = %id, role = %role, "account registered");
        Ok(profile)
    }

    async fn login(&self, email: &str, password: &str) -> IdentityResult<AuthSession> {
        validate::validate_credentials(email, password)?;
        let email = validate::normalize_email(email);

        let mut state = self.write()?;
        let Some(&id) = state.email_index.get(&email) else {
            return Err(IdentityError::InvalidCredentials);
        };
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or(IdentityError::InvalidCredentials)?;
        if !verify_password(&account.password_hash, password) {
            return Err(IdentityError::InvalidCredentials);
        }
        if !account.profile.is_active {
            return Err(IdentityError::AccountInactive);
        }

        let now = Utc::now();
        account.profile.last_login = Some(now);
        account.profile.updated_at = now;
        let principal = account.profile.principal();

        let session = AuthSession::issue(principal.clone(), self.ttl_secs);
        state.sessions.insert(
            session.token.clone(),
            SessionRecord {
                principal_id: principal.id,
                expires_at: session.expires_at,
            },
        );
        drop(state);

        let _ = self.events.send(AuthEvent::signed_in(principal));
        tracing::info!(principal = %id, "session opened");
        Ok(session)
    }

    async fn logout(&self, token: &SessionToken) -> IdentityResult<()> {
        let removed = self.write()?.sessions.remove(token);
        if let Some(record) = removed {
            let _ = self
                .events
                .send(AuthEvent::signed_out(record.principal_id));
            tracing::info!(principal = %record.principal_id, "session closed");
        }
        Ok(())
    }

    async fn resolve(&self, token: &SessionToken) -> IdentityResult<Option<Principal>> {
        let now = Utc::now();
        {
            let state = self.read()?;
            match state.sessions.get(token) {
                Some(record) if now < record.expires_at => {
                    // Re-read the profile row so role changes and
                    // deactivation apply to live sessions immediately.
                    let principal = state
                        .accounts
                        .get(&record.principal_id)
                        .filter(|account| account.profile.is_active)
                        .map(|account| account.profile.principal());
                    return Ok(principal);
                }
                Some(_) => {} // expired, prune below
                None => return Ok(None),
            }
        }
        self.write()?.sessions.remove(token);
        Ok(None)
    }

    async fn profile(&self, id: PrincipalId) -> IdentityResult<UserProfile> {
        let state = self.read()?;
        state
            .accounts
            .get(&id)
            .map(|account| account.profile.clone())
            .ok_or(IdentityError::NotFound)
    }

    async fn update_profile(
        &self,
        id: PrincipalId,
        update: ProfileUpdate,
    ) -> IdentityResult<UserProfile> {
        let mut state = self.write()?;
        let account = state.accounts.get_mut(&id).ok_or(IdentityError::NotFound)?;
        let profile = &mut account.profile;

        if let Some(name) = update.name {
            profile.name = name;
        }
        if let Some(first_name) = update.first_name {
            profile.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            profile.last_name = Some(last_name);
        }
        if let Some(display_name) = update.display_name {
            profile.display_name = Some(display_name);
        }
        if let Some(bio) = update.bio {
            profile.bio = Some(bio);
        }
        if let Some(avatar_url) = update.avatar_url {
            profile.avatar_url = Some(avatar_url);
        }
        if let Some(preferences) = update.preferences {
            profile.preferences = preferences;
        }
        profile.updated_at = Utc::now();
        let profile = profile.clone();
        drop(state);

        let _ = self.events.send(AuthEvent::profile_updated(id));
        Ok(profile)
    }

    async fn change_password(
        &self,
        id: PrincipalId,
        current: &str,
        new: &str,
    ) -> IdentityResult<()> {
        if !validate::is_valid_password(new) {
            return Err(ValidationError::PasswordTooShort.into());
        }
        let new_hash = hash_password(new)?;

        let mut state = self.write()?;
        let account = state.accounts.get_mut(&id).ok_or(IdentityError::NotFound)?;
        if !verify_password(&account.password_hash, current) {
            return Err(IdentityError::PasswordMismatch);
        }
        account.password_hash = new_hash;
        account.profile.updated_at = Utc::now();
        tracing::info!(principal = %id, "password changed");
        Ok(())
    }

    async fn assign_role(&self, id: PrincipalId, role: Role) -> IdentityResult<UserProfile> {
        let mut state = self.write()?;
        let account = state.accounts.get_mut(&id).ok_or(IdentityError::NotFound)?;
        account.profile.role = role;
        account.profile.updated_at = Utc::now();
        let profile = account.profile.clone();
        drop(state);

        let _ = self.events.send(AuthEvent::role_assigned(id, role));
        tracing::info!(principal = %id, role = %role, "role assigned");
        Ok(profile)
    }

    async fn set_active(&self, id: PrincipalId, active: bool) -> IdentityResult<UserProfile> {
        let mut state = self.write()?;
        let account = state.accounts.get_mut(&id).ok_or(IdentityError::NotFound)?;
        account.profile.is_active = active;
        account.profile.updated_at = Utc::now();
        let profile = account.profile.clone();

        if !active {
            let before = state.sessions.len();
            state.sessions.retain(|_, record| record.principal_id != id);
            let revoked = before - state.sessions.len();
            drop(state);
            let _ = self.events.send(AuthEvent::activation_changed(id, false));
            if revoked > 0 {
                let _ = self.events.send(AuthEvent::signed_out(id));
            }
            tracing::info!(principal = %id, revoked, "account deactivated");
        } else {
            drop(state);
            let _ = self.events.send(AuthEvent::activation_changed(id, true));
            tracing::info!(principal = %id, "account activated");
        }
        Ok(profile)
    }

    async fn list_users(&self, query: UserQuery) -> IdentityResult<Vec<UserProfile>> {
        let state = self.read()?;
        let mut rows: Vec<&UserProfile> = state
            .accounts
            .values()
            .map(|account| &account.profile)
            .filter(|profile| query.role.is_none_or(|role| profile.role == role))
            .filter(|profile| query.is_active.is_none_or(|active| profile.is_active == active))
            .collect();
        // Newest first, id as the tie-breaker for a stable order.
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(&a.id.as_uuid()))
        });
        let rows = rows.into_iter().skip(query.offset() as usize);
        Ok(match query.page_size() {
            Some(limit) => rows.take(limit as usize).cloned().collect(),
            None => rows.cloned().collect(),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
