//! Authorization introspection for admin screens: the role table, the
//! caller's own capability flags, and a dry-run of the route guard.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use rolegate_policy::{Principal, PrincipalId, Role};

use crate::app::services::AppServices;
use crate::context::CurrentPrincipal;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/permissions", get(my_permissions))
        .route("/explain", get(explain))
}

/// GET /admin/authz/roles - The full role table, ranks and capabilities
pub async fn list_roles() -> impl IntoResponse {
    let roles: Vec<_> = Role::ALL
        .iter()
        .map(|role| {
            json!({
                "role": role,
                "rank": role.rank(),
                "permissions": role.permissions(),
            })
        })
        .collect();

    Json(json!({
        "success": true,
        "roles": roles,
    }))
}

/// GET /admin/authz/permissions - The caller's capability flags
pub async fn my_permissions(
    Extension(current): Extension<CurrentPrincipal>,
) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "role": current.role(),
        "permissions": current.role().permissions(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub path: String,
    /// Role to probe with; absent means an anonymous request.
    pub role: Option<Role>,
}

/// GET /admin/authz/explain - Dry-run the guard for a path and role
pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ExplainQuery>,
) -> impl IntoResponse {
    let probe = query
        .role
        .map(|role| Principal::new(PrincipalId::new(), "probe@example.com", role));
    let trace = services.authorizer().explain(&query.path, probe.as_ref());

    Json(json!({
        "success": true,
        "trace": trace,
    }))
}
