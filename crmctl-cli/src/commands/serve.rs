//! HTTP server command
//!
//! Serves the GraphQL API (plus GraphiQL and /health) until Ctrl+C/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use crmctl_core::CrmConfig;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides [server].bind)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment); omit for the in-memory store
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: CrmConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }
    if let Some(url) = args.database_url {
        config.server.database_url = Some(url);
    }

    tracing::info!(bind = %config.server.bind, "starting crmctl server");

    // Run server (blocks until shutdown)
    crmctl_server::serve(&config.server)
        .await
        .context("Server error")?;

    Ok(())
}
