//! Darkweb Monitor — Binary Entrypoint
//! Wires config, fetcher, store and notifier together and starts the
//! recurring scan job. The process then idles until ctrl-c.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use darkweb_monitor::config::{self, MonitorConfig};
use darkweb_monitor::notify::telegram::TelegramNotifier;
use darkweb_monitor::scan::fetcher::HttpFetcher;
use darkweb_monitor::store::MemoryStore;
use darkweb_monitor::{ScanPipeline, ScanScheduler, SCAN_JOB_ID};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("darkweb_monitor=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = MonitorConfig::from_env();
    let targets = config::load_targets_default()?;
    let keywords = config::load_keywords_default()?;
    if targets.is_empty() {
        tracing::warn!("no targets configured; scheduler will tick over an empty list");
    }

    let fetcher = Arc::new(HttpFetcher::new(&cfg.proxy)?);
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(TelegramNotifier::from_env());

    let pipeline = ScanPipeline::new(
        fetcher,
        store,
        notifier,
        keywords,
        cfg.fetch_timeout,
    );
    let scheduler = ScanScheduler::new(cfg.interval, targets, pipeline);
    scheduler.start(SCAN_JOB_ID);

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
