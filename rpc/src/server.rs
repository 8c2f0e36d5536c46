//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tally_voting::VoteService;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::RpcMetrics;

/// Shared state behind every handler.
pub struct RpcState {
    pub service: Arc<VoteService>,
    pub metrics: Arc<RpcMetrics>,
}

impl RpcState {
    pub fn new(service: Arc<VoteService>) -> Self {
        Self {
            service,
            metrics: Arc::new(RpcMetrics::new()),
        }
    }
}

/// Build the application router. Every response carries permissive CORS
/// headers.
pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route(
            "/api/projects/:project_id/vote",
            post(handlers::cast_vote).fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub listen_addr: SocketAddr,
    pub state: Arc<RpcState>,
}

impl RpcServer {
    pub fn with_state(listen_addr: SocketAddr, state: Arc<RpcState>) -> Self {
        Self { listen_addr, state }
    }

    /// Serve until `shutdown` resolves. In-flight requests are allowed to
    /// finish.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|source| RpcError::Bind {
                addr: self.listen_addr.to_string(),
                source,
            })?;
        info!("vote API listening on {}", self.listen_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
