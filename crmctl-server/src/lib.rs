//! crmctl-server: GraphQL HTTP server and PostgreSQL store
//!
//! - [`db`]: pool, idempotent schema creation and the sqlx-backed `Store`
//! - [`graphql`]: schema registration, resolvers, error codes
//! - [`http`]: axum router, CORS, tracing, graceful shutdown
//! - [`seed`]: demo data through the regular service operations

pub mod db;
pub mod error;
pub mod graphql;
pub mod http;
pub mod seed;
pub mod state;

use std::sync::Arc;

use crmctl_core::config::ServerSettings;
use crmctl_core::{CrmService, MemoryStore, Store};

pub use error::{ServerError, ServerResult};
pub use graphql::{build_schema, execute_json, CrmSchema};
pub use http::{build_router, run_server, shutdown_signal};
pub use state::AppState;

/// Open the configured store.
///
/// With a database URL this connects, creates the schema and returns a
/// [`db::PgStore`]; without one it falls back to an empty in-memory store.
pub async fn open_store(settings: &ServerSettings) -> ServerResult<Arc<dyn Store>> {
    match &settings.database_url {
        Some(url) => {
            let pool = db::create_pool_with_options(url, settings.max_connections).await?;
            db::migrations::run(&pool).await?;
            tracing::info!(max_connections = settings.max_connections, "connected to PostgreSQL");
            Ok(Arc::new(db::PgStore::new(pool)))
        }
        None => {
            tracing::warn!("no database_url configured, using in-memory store (data is not persisted)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Open the store, register the schema and serve until Ctrl+C/SIGTERM.
pub async fn serve(settings: &ServerSettings) -> ServerResult<()> {
    let store = open_store(settings).await?;
    let schema = build_schema(CrmService::new(store));
    let state = AppState::new(schema, &settings.graphql_path);
    run_server(state, settings, shutdown_signal()).await
}
