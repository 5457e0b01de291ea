use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use rolegate_identity::{IdentityProvider, MemoryIdentityProvider};
use rolegate_policy::RouteAuthorizer;

use crate::app::Settings;

/// Long-lived services shared by handlers and the route guard.
pub struct AppServices {
    provider: Arc<dyn IdentityProvider>,
    authorizer: Arc<RouteAuthorizer>,
}

impl AppServices {
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    pub fn authorizer(&self) -> &RouteAuthorizer {
        &self.authorizer
    }
}

pub fn build_services(settings: &Settings) -> AppServices {
    let provider: Arc<dyn IdentityProvider> =
        Arc::new(MemoryIdentityProvider::with_session_ttl(settings.session_ttl_secs));

    tracing::info!(
        public_routes = settings.guard.public_routes.len(),
        rules = settings.guard.rules.len(),
        session_ttl_secs = settings.session_ttl_secs,
        "services wired"
    );

    AppServices {
        provider,
        authorizer: Arc::new(RouteAuthorizer::new(settings.guard.clone())),
    }
}

/// Build an SSE stream over the provider's auth events (used by `/auth/events`).
///
/// The broadcast channel is lossy; a receiver that lags far enough simply
/// skips the missed events and picks the stream back up.
pub fn auth_event_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.provider().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(event.kind()).data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
