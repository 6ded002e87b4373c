//! Router assembly and the HTTP server loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use offsec_auth::{IdentityResolver, resolver_for};
use offsec_config::AuthConfig;
use offsec_db::service::OffsecService;

/// Shared state handed to every handler.
pub struct AppState {
    pub svc: OffsecService,
    pub resolver: Box<dyn IdentityResolver>,
}

impl AppState {
    /// Build state with the resolver selected by `auth`.
    #[must_use]
    pub fn new(svc: OffsecService, auth: &AuthConfig) -> Self {
        Self {
            svc,
            resolver: resolver_for(auth),
        }
    }
}

/// The full API router with request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    crate::routes::api_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl-C.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "offsec api listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
