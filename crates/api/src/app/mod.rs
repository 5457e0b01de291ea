//! HTTP application wiring (Axum router + service wiring).
//!
//! The folder is structured like:
//! - `services.rs`: identity provider + route authorizer wiring
//! - `routes/`: HTTP routes + handlers (one file per surface area)
//! - `dto.rs`: request DTOs shared across handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use rolegate_identity::DEFAULT_SESSION_TTL_SECS;
use rolegate_policy::GuardConfig;
use tower::ServiceBuilder;

use crate::guard;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Environment variable naming a JSON file with the guard configuration.
pub const GUARD_CONFIG_ENV: &str = "ROLEGATE_GUARD_CONFIG";
/// Environment variable overriding the session lifetime, in seconds.
pub const SESSION_TTL_ENV: &str = "ROLEGATE_SESSION_TTL_SECS";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub guard: GuardConfig,
    pub session_ttl_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            guard: GuardConfig::default(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl Settings {
    /// Reads settings from the environment. Absent variables fall back to
    /// defaults; present-but-invalid ones fail startup rather than being
    /// silently replaced.
    pub fn from_env() -> anyhow::Result<Self> {
        let guard = match std::env::var(GUARD_CONFIG_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .map_err(|err| anyhow::anyhow!("reading {path}: {err}"))?;
                GuardConfig::from_json(&raw)?
            }
            Err(_) => GuardConfig::default(),
        };

        let session_ttl_secs = match std::env::var(SESSION_TTL_ENV) {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|err| anyhow::anyhow!("{SESSION_TTL_ENV} must be an integer: {err}"))?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            guard,
            session_ttl_secs,
        })
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(settings: Settings) -> Router {
    let services = Arc::new(services::build_services(&settings));
    let guard_state = guard::GuardState {
        services: services.clone(),
    };

    // Auth endpoints sit outside the guard; they do their own session checks.
    let auth = routes::auth::router().layer(Extension(services.clone()));

    // Everything else goes through the route guard, including the fallback,
    // so unknown paths get the same treatment as known ones.
    let guarded = routes::guarded_router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            guard_state,
            guard::route_guard,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", auth)
        .merge(guarded)
        .layer(ServiceBuilder::new())
}
