use std::sync::Arc;

use leaderboard::server;
use leaderboard::sync::{Discovery, SyncOutcome};
use tokio::net::TcpListener;

use crate::commands::shared::build_discovery;
use crate::config::Config;
use crate::progress::{LoggingReporter, ProgressReporter};
use crate::shutdown::shutdown_signal;

/// Serve the HTTP API, seeding an empty catalog in the background first.
pub(crate) async fn handle_serve(
    host: Option<String>,
    port: Option<u16>,
    no_initial_sync: bool,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let discovery = build_discovery(config, database_url, config.sync.no_rate_limit).await?;

    if config.sync.initial_sync && !no_initial_sync {
        tokio::spawn(initial_sync(Arc::clone(&discovery)));
    }

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    println!("Leaderboard API listening on http://{}", listener.local_addr()?);

    server::serve(listener, discovery, shutdown_signal()).await?;
    Ok(())
}

async fn initial_sync(discovery: Arc<Discovery>) {
    // Bars would interleave with request logs, so always log.
    let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
    let callback = reporter.as_callback();

    match discovery.sync_if_empty(Some(&callback)).await {
        None => tracing::debug!("Catalog already populated, skipping initial sync"),
        Some(SyncOutcome::Completed(summary)) => {
            tracing::info!(total = summary.total, "Initial sync complete");
        }
        Some(SyncOutcome::Rejected { reason }) => {
            tracing::info!(reason = %reason, "Initial sync skipped");
        }
        Some(SyncOutcome::Failed { reason }) => {
            tracing::error!(reason = %reason, "Initial sync failed");
        }
    }
}
