use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Uri;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use clinic_core::{ClinicConfigSnapshot, Failure, Responder, TracingSink};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::middlewares::{capture_panic, normalize_errors, require_available, Availability};
use crate::{ClinicAxumError, ClinicAxumState};

/// Builder for the API router with error normalization wired in.
#[derive(Clone)]
pub struct ClinicApp {
    pub state: ClinicAxumState,
    pub router: Router<()>,
}

impl ClinicApp {
    pub fn new(responder: Responder) -> Self {
        Self {
            state: ClinicAxumState::new(responder),
            router: Router::new(),
        }
    }

    /// Responder with the configured locale, logging through `tracing`.
    pub fn from_config(config: &ClinicConfigSnapshot) -> anyhow::Result<Self> {
        let catalog = config.message_catalog()?;
        Ok(Self::new(Responder::new(catalog, Arc::new(TracingSink))))
    }

    pub fn responder(&self) -> Arc<Responder> {
        Arc::clone(&self.state.responder)
    }

    pub fn availability(&self) -> Availability {
        self.state.availability.clone()
    }

    pub fn nest(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn merge(mut self, router: Router<()>) -> Self {
        self.router = self.router.merge(router);
        self
    }

    pub fn route_get<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    /// Final router. Layers, innermost first: availability gate, panic
    /// capture, error normalization, tracing, request id.
    ///
    /// Unknown paths and unsupported methods both answer 404.
    pub fn into_router(self) -> Router<()> {
        let state = self.state;
        self.router
            .fallback(route_not_found)
            .method_not_allowed_fallback(route_not_found)
            .layer(middleware::from_fn_with_state(state.clone(), require_available))
            .layer(CatchPanicLayer::custom(capture_panic))
            .layer(middleware::from_fn_with_state(state, normalize_errors))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = ?listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

async fn route_not_found(uri: Uri) -> ClinicAxumError {
    let failure = Failure::not_found().with_technical_message(format!("no route for {}", uri.path()));
    if uri.path().starts_with("/api/") {
        failure.with_user_message("Rota de API não encontrada").into()
    } else {
        failure.into()
    }
}
