use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use rolegate_identity::NewAccount;
use rolegate_policy::Role;

use crate::app::dto::{LoginRequest, RegisterRequest};
use crate::app::errors::{identity_error_response, json_error};
use crate::app::services::{self, AppServices};
use crate::guard::bearer_token;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/register", post(register))
        .route("/me", get(me))
        .route("/events", get(events))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session endpoints
// ─────────────────────────────────────────────────────────────────────────────

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    match services.provider().login(&body.email, &body.password).await {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Login successful",
                "token": session.token,
                "expires_at": session.expires_at,
                "user": session.principal,
            })),
        )
            .into_response(),
        Err(err) => identity_error_response(err),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let Some(token) = bearer_token(&headers) else {
        return json_error(StatusCode::BAD_REQUEST, "No active session");
    };

    match services.provider().logout(&token).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Logged out successfully",
            })),
        )
            .into_response(),
        Err(err) => identity_error_response(err),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    // Role labels are validated here, before anything touches the store.
    let role = match body.role.as_deref().map(str::parse::<Role>).transpose() {
        Ok(role) => role,
        Err(err) => return identity_error_response(err.into()),
    };

    let account = NewAccount {
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        role,
    };

    match services.provider().register(account).await {
        Ok(profile) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "User registered successfully",
                "user": profile,
            })),
        )
            .into_response(),
        Err(err) => identity_error_response(err),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let Some(token) = bearer_token(&headers) else {
        return json_error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    match services.provider().resolve(&token).await {
        Ok(Some(principal)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "user": principal,
            })),
        )
            .into_response(),
        Ok(None) => json_error(StatusCode::UNAUTHORIZED, "Not authenticated"),
        Err(err) => identity_error_response(err),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event stream
// ─────────────────────────────────────────────────────────────────────────────

/// Live sign-in/sign-out feed for admin monitoring, so it takes the same
/// capability as the user management API.
pub async fn events(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let Some(token) = bearer_token(&headers) else {
        return json_error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    let principal = match services.provider().resolve(&token).await {
        Ok(Some(principal)) => principal,
        Ok(None) => return json_error(StatusCode::UNAUTHORIZED, "Not authenticated"),
        Err(err) => return identity_error_response(err),
    };

    if !principal.role.permissions().can_manage_users {
        return json_error(StatusCode::FORBIDDEN, "Insufficient permissions");
    }

    services::auth_event_stream(services).into_response()
}
