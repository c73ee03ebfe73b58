//! Axum server setup
//!
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::future::Future;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crmctl_core::config::ServerSettings;

use super::routes;
use crate::error::ServerResult;
use crate::state::AppState;

/// Build the router: GraphQL endpoint, health check, CORS and tracing.
pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    let cors = if settings.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(local_origins(settings.bind))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::graphql::router(&settings.graphql_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser origins allowed without permissive CORS
fn local_origins(bind: SocketAddr) -> Vec<HeaderValue> {
    let mut ports = vec![3000, bind.port()];
    ports.dedup();
    ports
        .into_iter()
        .flat_map(|port| [format!("http://localhost:{}", port), format!("http://127.0.0.1:{}", port)])
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect()
}

/// Serve `state` on the configured address until `shutdown` resolves.
pub async fn run_server(
    state: AppState,
    settings: &ServerSettings,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> ServerResult<()> {
    let app = build_router(state, settings);

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!(
        addr = %settings.bind,
        graphql = %settings.graphql_path,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
