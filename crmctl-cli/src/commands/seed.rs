use anyhow::{Context, Result};
use clap::Parser;

use crmctl_core::{CrmConfig, CrmService};
use crmctl_server::open_store;
use crmctl_server::seed::seed;

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Insert the demo customers, product and order
pub async fn run_seed(args: SeedArgs, mut config: CrmConfig) -> Result<()> {
    if let Some(url) = args.database_url {
        config.server.database_url = Some(url);
    }
    if config.server.database_url.is_none() {
        tracing::warn!("no database configured; seeding the in-memory store only checks the data");
    }

    let store = open_store(&config.server)
        .await
        .context("Failed to open store")?;
    let report = seed(&CrmService::new(store)).await.context("Seeding failed")?;

    if report.skipped {
        println!("Demo data already present, nothing to do.");
    } else {
        println!(
            "Seeded {} customers, {} products, {} orders.",
            report.customers, report.products, report.orders
        );
    }
    Ok(())
}
