//! Background telemetry poller.
//!
//! Periodically fetches the endpoint's system snapshot and caches the most
//! recent one for display. Purely cosmetic: a failed poll is logged and
//! skipped, and nothing downstream depends on the cached value.

use engine::{ComputeBackend, SystemSnapshot};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, warn};

pub struct TelemetryPoller {
    latest: Arc<Mutex<Option<SystemSnapshot>>>,
    poll_task: Option<JoinHandle<()>>,
}

impl TelemetryPoller {
    /// Spawns the poll loop; the first fetch happens immediately.
    pub fn start<B: ComputeBackend + 'static>(backend: Arc<B>, period: Duration) -> Self {
        let latest = Arc::new(Mutex::new(None));

        let poll_task = {
            let latest = Arc::clone(&latest);
            tokio::spawn(async move {
                let mut ticker = interval(period);
                loop {
                    ticker.tick().await;
                    match backend.system_info().await {
                        Ok(snapshot) => {
                            *latest.lock().unwrap() = Some(snapshot);
                        }
                        Err(e) => {
                            warn!("System info poll failed: {}", e);
                        }
                    }
                }
            })
        };

        Self {
            latest,
            poll_task: Some(poll_task),
        }
    }

    /// Most recent snapshot, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<SystemSnapshot> {
        self.latest.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
            debug!("Telemetry poller stopped");
        }
    }
}

impl Drop for TelemetryPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
