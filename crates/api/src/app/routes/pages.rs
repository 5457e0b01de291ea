use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use rolegate_identity::ProfileUpdate;
use rolegate_policy::Role;

use crate::app::dto::ChangePasswordRequest;
use crate::app::errors::{identity_error_response, json_error};
use crate::app::services::AppServices;
use crate::context::CurrentPrincipal;

/// Display copy only; the capability table is what gates actions.
fn role_description(role: Role) -> &'static str {
    match role {
        Role::Superadmin => "Full system access and user management",
        Role::Admin => "Can manage all content and moderate submissions",
        Role::User => "Can read and browse published content",
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Public pages
// ─────────────────────────────────────────────────────────────────────────────

pub async fn home(current: Option<Extension<CurrentPrincipal>>) -> impl IntoResponse {
    Json(json!({
        "page": "home",
        "signed_in": current.is_some(),
    }))
}

pub async fn signin() -> impl IntoResponse {
    Json(json!({ "page": "signin" }))
}

pub async fn signup() -> impl IntoResponse {
    Json(json!({ "page": "signup" }))
}

pub async fn auth_error(Query(query): Query<ErrorQuery>) -> impl IntoResponse {
    Json(json!({
        "page": "auth-error",
        "error": query.error,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Signed-in pages
// ─────────────────────────────────────────────────────────────────────────────

/// The guard echoes denial codes into the query string, so the page
/// payload carries them back out for display.
pub async fn dashboard(
    Extension(current): Extension<CurrentPrincipal>,
    Query(query): Query<ErrorQuery>,
) -> impl IntoResponse {
    let role = current.role();
    Json(json!({
        "page": "dashboard",
        "user": current.principal(),
        "role": role,
        "description": role_description(role),
        "permissions": role.permissions(),
        "error": query.error,
    }))
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
) -> axum::response::Response {
    match services.provider().profile(current.id()).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "user": profile,
            })),
        )
            .into_response(),
        Err(err) => identity_error_response(err),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Json(update): Json<ProfileUpdate>,
) -> axum::response::Response {
    if update.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "No fields to update");
    }

    match services.provider().update_profile(current.id(), update).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Profile updated successfully",
                "user": profile,
            })),
        )
            .into_response(),
        Err(err) => identity_error_response(err),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Json(body): Json<ChangePasswordRequest>,
) -> axum::response::Response {
    match services
        .provider()
        .change_password(current.id(), &body.current_password, &body.new_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Password updated successfully",
            })),
        )
            .into_response(),
        Err(err) => identity_error_response(err),
    }
}

/// Fallback for the guarded router: the guard has already let the request
/// through, there is just nothing at this path.
pub async fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "Not found")
}
