//! Admin routes for user management.
//!
//! The route guard already keeps non-admin roles out of `/admin`. On top of
//! that, every handler here checks the acting principal's capability flags,
//! and those flags grant user management to superadmins only.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use rolegate_identity::UserQuery;
use rolegate_policy::{PrincipalId, Role};

use crate::app::dto::AssignRoleRequest;
use crate::app::routes::authz;
use crate::app::{errors, services::AppServices};
use crate::context::CurrentPrincipal;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/", get(overview))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", post(assign_role))
        .route("/users/:id/activate", post(activate_user))
        .route("/users/:id/deactivate", post(deactivate_user))
        .nest("/authz", authz::router())
}

// ─────────────────────────────────────────────────────────────────────────────
// Capability checks
// ─────────────────────────────────────────────────────────────────────────────

fn require_manage_users(current: &CurrentPrincipal) -> Result<(), axum::response::Response> {
    if current.role().permissions().can_manage_users {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "Insufficient permissions",
        ))
    }
}

fn require_assign_roles(current: &CurrentPrincipal) -> Result<(), axum::response::Response> {
    if current.role().permissions().can_assign_roles {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "Insufficient permissions",
        ))
    }
}

fn parse_principal_id(raw: &str) -> Result<PrincipalId, axum::response::Response> {
    match raw.parse::<Uuid>() {
        Ok(id) => Ok(PrincipalId::from_uuid(id)),
        Err(_) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "Invalid user id",
        )),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin - Admin landing page. Any admin-tier role can see the page
/// itself; the management endpoints below gate on capability.
pub async fn overview(Extension(current): Extension<CurrentPrincipal>) -> impl IntoResponse {
    Json(json!({
        "page": "admin",
        "user": current.principal(),
        "can_manage_users": current.role().permissions().can_manage_users,
    }))
}

/// GET /admin/users - List user accounts, paged when the query asks for it
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Query(query): Query<UserQuery>,
) -> axum::response::Response {
    if let Err(resp) = require_manage_users(&current) {
        return resp;
    }

    match services.provider().list_users(query).await {
        Ok(users) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "count": users.len(),
                "users": users,
            })),
        )
            .into_response(),
        Err(err) => errors::identity_error_response(err),
    }
}

/// GET /admin/users/:id - Fetch one account
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_manage_users(&current) {
        return resp;
    }
    let id = match parse_principal_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.provider().profile(id).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "user": profile,
            })),
        )
            .into_response(),
        Err(err) => errors::identity_error_response(err),
    }
}

/// POST /admin/users/:id/role - Move an account to a different role
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Path(id): Path<String>,
    Json(body): Json<AssignRoleRequest>,
) -> axum::response::Response {
    if let Err(resp) = require_assign_roles(&current) {
        return resp;
    }
    let id = match parse_principal_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let role = match body.role.parse::<Role>() {
        Ok(role) => role,
        Err(err) => return errors::identity_error_response(err.into()),
    };

    match services.provider().assign_role(id, role).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Role updated successfully",
                "user": profile,
            })),
        )
            .into_response(),
        Err(err) => errors::identity_error_response(err),
    }
}

/// POST /admin/users/:id/activate - Re-enable sign-in for an account
pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    set_active(services, current, &id, true).await
}

/// POST /admin/users/:id/deactivate - Disable sign-in and revoke sessions
pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentPrincipal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    set_active(services, current, &id, false).await
}

async fn set_active(
    services: Arc<AppServices>,
    current: CurrentPrincipal,
    raw_id: &str,
    active: bool,
) -> axum::response::Response {
    if let Err(resp) = require_manage_users(&current) {
        return resp;
    }
    let id = match parse_principal_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.provider().set_active(id, active).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": if active {
                    "User activated successfully"
                } else {
                    "User deactivated successfully"
                },
                "user": profile,
            })),
        )
            .into_response(),
        Err(err) => errors::identity_error_response(err),
    }
}
