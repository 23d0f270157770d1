//! Stock Sync - vendor stock to marketplace
//!
//! One invocation is one full sync: catalog, feed, reconcile, upload.
//! Meant to be run from cron; exits non-zero when anything failed.

use clap::Parser;
use std::time::Duration;
use stock_sync::cli::{Args, Command};
use stock_sync::{build_http_client, run_market, run_ozon, Result, SyncSummary};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Credentials may live in .env next to the binary
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    log::info!("Starting stock_sync...");

    match run(args).await {
        Ok(summary) => {
            summary.log();
            if summary.has_failures() {
                log::error!("Sync finished with failed batches");
                std::process::exit(1);
            }
            log::info!("Sync completed successfully.");
        }
        Err(e) => {
            log::error!("Sync failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<SyncSummary> {
    let http = build_http_client(Duration::from_secs(args.timeout_secs))?;

    match args.command {
        Command::Ozon(ozon) => {
            let config = ozon.into_config()?;
            run_ozon(&config, &http).await
        }
        Command::Market(market) => {
            let config = market.into_config()?;
            run_market(&config, &http).await
        }
    }
}
