use axum::{
    routing::{get, post},
    Router,
};

pub mod admin;
pub mod auth;
pub mod authz;
pub mod pages;
pub mod system;

/// Router for everything behind the route guard: page endpoints, the
/// admin API, and the fallback that catches unknown paths.
pub fn guarded_router() -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/auth/signin", get(pages::signin))
        .route("/auth/signup", get(pages::signup))
        .route("/auth/error", get(pages::auth_error))
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile).patch(pages::update_profile))
        .route("/profile/password", post(pages::change_password))
        .nest("/admin", admin::router())
        .fallback(pages::not_found)
}
