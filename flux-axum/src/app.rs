use axum::extract::DefaultBodyLimit;
use axum::Router;
use flux_blob::FluxAdapter;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rest;
use crate::FluxAxumState;

/// Smallest request body limit, matching axum's own default (2 MiB)
const MIN_BODY_LIMIT: usize = 2 * 1024 * 1024;

pub struct FluxAxumApp {
    pub state: FluxAxumState,
    pub router: Router<()>,
}

impl Clone for FluxAxumApp {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            router: self.router.clone(),
        }
    }
}

impl FluxAxumApp {
    /// Mount the upload routes under `/uploads`
    pub fn new(adapter: FluxAdapter) -> Self {
        let body_limit = adapter.config().chunk_size.saturating_mul(2).max(MIN_BODY_LIMIT);
        let state = FluxAxumState::new(adapter);

        let router = Router::new()
            .nest("/uploads", rest::upload_router(state.clone()))
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Self { state, router }
    }

    /// Nest another router next to the upload routes
    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "flux upload server listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

pub fn axum(adapter: FluxAdapter) -> FluxAxumApp {
    FluxAxumApp::new(adapter)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
    }
}
