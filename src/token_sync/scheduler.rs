use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::service::{RefreshOutcome, TokenSyncService};

/// Recurring refresh driver, independent of read traffic. Overlap protection
/// lives in the sync service's guard; a tick that lands mid-run is skipped.
pub struct TokenRefreshScheduler {
    sync_service: Arc<TokenSyncService>,
    interval: Duration,
    is_running: Arc<RwLock<bool>>,
}

impl TokenRefreshScheduler {
    pub fn new(sync_service: Arc<TokenSyncService>, interval: Duration) -> Self {
        Self {
            sync_service,
            interval,
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// Starts the ticking loop. The first refresh fires one interval after
    /// start; the cache-miss read path covers a cold store until then.
    pub async fn start(&self) {
        let mut is_running = self.is_running.write().await;
        if *is_running {
            warn!("Token refresh scheduler is already running");
            return;
        }
        *is_running = true;
        drop(is_running);

        info!(
            "Starting token refresh scheduler with {}s interval",
            self.interval.as_secs()
        );

        let sync_service = Arc::clone(&self.sync_service);
        let is_running = Arc::clone(&self.is_running);
        let interval = self.interval;

        tokio::spawn(async move {
            loop {
                sleep(interval).await;

                if !*is_running.read().await {
                    info!("Token refresh scheduler stopped");
                    break;
                }

                match sync_service.refresh_if_idle().await {
                    Ok(RefreshOutcome::Completed(saved)) => {
                        info!("Scheduled refresh completed: {} tokens saved", saved)
                    }
                    Ok(RefreshOutcome::Skipped) => {
                        warn!("Previous refresh still running, tick skipped")
                    }
                    Err(e) => error!("Scheduled refresh failed: {}", e),
                }
            }
        });
    }

    /// Requests the loop to exit at its next tick.
    pub async fn stop(&self) {
        let mut is_running = self.is_running.write().await;
        *is_running = false;
        info!("Token refresh scheduler stop requested");
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}
