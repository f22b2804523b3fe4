//! Background CSRF refresh bound to a scoped handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use portcullis_core::error::AppError;
use portcullis_core::result::AppResult;

use super::manager::CsrfManager;

/// Handle to the periodic CSRF refresh task.
///
/// The task runs until [`CsrfRefresher::shutdown`] is awaited or the handle
/// is dropped; dropping aborts the task, so a refresher can never outlive
/// the scope that owns it.
#[derive(Debug)]
pub struct CsrfRefresher {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl CsrfManager {
    /// Spawn the periodic refresh on the current tokio runtime.
    ///
    /// The first refresh happens one `period` after spawning. Failed
    /// refreshes are logged and leave the previous token in place. A zero
    /// `period` is a configuration error.
    pub fn spawn_refresher(self: &Arc<Self>, period: Duration) -> AppResult<CsrfRefresher> {
        if period.is_zero() {
            return Err(AppError::configuration("CSRF refresh period must be non-zero"));
        }
        Ok(self.spawn_ticker(period))
    }

    /// Start the refresher at `csrf.refresh_interval_seconds`, or return
    /// `None` when that is `0`.
    pub fn start_refresher(self: &Arc<Self>) -> Option<CsrfRefresher> {
        match self.config().refresh_interval_seconds {
            0 => {
                debug!("CSRF refresher disabled");
                None
            }
            secs => Some(self.spawn_ticker(Duration::from_secs(secs))),
        }
    }

    fn spawn_ticker(self: &Arc<Self>, period: Duration) -> CsrfRefresher {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(period_secs = period.as_secs(), "CSRF refresher started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!("Periodic CSRF refresh");
                        if let Err(e) = manager.fetch_token().await {
                            warn!(error = %e, "Periodic CSRF refresh failed");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("CSRF refresher stopped");
        });

        CsrfRefresher {
            shutdown_tx,
            handle: Some(handle),
        }
    }
}

impl CsrfRefresher {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "CSRF refresher task failed");
                }
            }
        }
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CsrfRefresher {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
