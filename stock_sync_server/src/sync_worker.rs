use std::{sync::Arc, time::Duration};

use log::*;
use stock_sync_engine::RunStatus;
use tokio::task::JoinHandle;

use crate::server::GatewayOrchestrator;

/// Starts the interval sync worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The worker only triggers runs; the orchestrator's single-flight guard decides whether a tick actually does
/// anything, so a slow run never stacks up behind itself.
pub fn start_sync_worker(orchestrator: Arc<GatewayOrchestrator>, period: Duration, run_at_startup: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Catalog sync worker started. Interval: {}s", period.as_secs());
        if !run_at_startup {
            // An interval's first tick fires immediately. Swallow it so the first run waits a full period.
            timer.tick().await;
        }
        loop {
            timer.tick().await;
            info!("🕰️ Running scheduled catalog sync");
            let result = orchestrator.run().await;
            match result.status {
                RunStatus::Completed => info!(
                    "🕰️ Scheduled sync finished. {} checked, {} updated, {} failed",
                    result.counts.checked, result.counts.updated, result.counts.failed
                ),
                RunStatus::AlreadyRunning => {
                    debug!("🕰️ The previous sync is still in flight. Skipping this tick.");
                },
                RunStatus::Failed => {
                    error!("🕰️ Scheduled sync failed: {}", result.error.unwrap_or_else(|| "unknown".to_string()));
                },
            }
        }
    })
}
