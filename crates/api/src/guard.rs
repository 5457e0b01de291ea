use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use rolegate_identity::SessionToken;
use rolegate_policy::RouteAuthorizer;

use crate::app::services::AppServices;
use crate::context::CurrentPrincipal;

/// Shared state for the route guard middleware.
#[derive(Clone)]
pub struct GuardState {
    pub services: Arc<AppServices>,
}

/// Pulls the session token out of the Authorization header.
///
/// Missing, malformed, and empty values all come back as `None`; the
/// guard treats those requests as anonymous instead of rejecting them.
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(SessionToken::from(token))
    }
}

/// Route guard: resolves the session (if any) and asks the authorizer
/// whether the request may proceed.
///
/// `Allow` passes through with the principal attached as a request
/// extension; every other decision becomes a 303 redirect to the target
/// the decision names.
pub async fn route_guard(
    State(state): State<GuardState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let principal = match bearer_token(req.headers()) {
        Some(token) => match state.services.provider().resolve(&token).await {
            Ok(principal) => principal,
            Err(err) => {
                // Fail closed: an unresolvable session gets anonymous treatment.
                tracing::warn!("session resolution failed: {err}");
                None
            }
        },
        None => None,
    };

    let decision = state.services.authorizer().decide(&path, principal.as_ref());

    match RouteAuthorizer::redirect_target(&decision) {
        None => {
            if let Some(principal) = principal {
                req.extensions_mut().insert(CurrentPrincipal::new(principal));
            }
            next.run(req).await
        }
        Some(target) => Redirect::to(&target).into_response(),
    }
}
