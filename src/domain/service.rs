use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{ConnectionTracker, Result};
use crate::ports::{ServerPort, TerminationTrigger, TrackingPort};

/// Drives one serving session from start to a drained (or killed) shutdown.
#[derive(Clone)]
pub struct ShutdownOrchestrator {
    server: Arc<dyn ServerPort>,
    timeout: Duration,
}

impl ShutdownOrchestrator {
    /// `timeout` bounds how long in-flight connections may take once the
    /// listener is closed. Zero waits for them indefinitely.
    pub fn new(server: Arc<dyn ServerPort>, timeout: Duration) -> Self {
        Self { server, timeout }
    }

    /// Serve until `trigger` fires, then drain.
    ///
    /// Returns the result of the serve loop unchanged; a clean shutdown yields
    /// [`GracefulError::ServerClosed`](super::GracefulError::ServerClosed).
    pub async fn run(&self, trigger: Box<dyn TerminationTrigger>) -> Result<()> {
        let (tracker, tracker_task) = ConnectionTracker::new().spawn();
        let tracker: Arc<dyn TrackingPort> = Arc::new(tracker);

        let watcher = tokio::spawn(watch_trigger(trigger, self.server.clone()));

        let served = self.server.serve(tracker.clone()).await;
        match &served {
            Err(e) if e.is_server_closed() => info!("Listener closed, draining connections"),
            Err(e) => warn!(error = %e, "Serve loop failed, draining connections"),
            Ok(()) => info!("Serve loop returned, draining connections"),
        }

        self.drain(tracker.as_ref()).await;

        match tracker_task.await {
            Ok(outcome) => debug!(?outcome, "shutdown session finished"),
            Err(e) => warn!("Connection tracker task failed: {}", e),
        }
        // Serving may have ended without a trigger; stop listening for one.
        watcher.abort();

        served
    }

    async fn drain(&self, tracker: &dyn TrackingPort) {
        if self.timeout.is_zero() {
            tracker.drained().await;
            return;
        }

        if timeout(self.timeout, tracker.drained()).await.is_err() {
            warn!(timeout = ?self.timeout, "Drain timed out, killing remaining connections");
            tracker.force_kill();
        }
    }
}

async fn watch_trigger(mut trigger: Box<dyn TerminationTrigger>, server: Arc<dyn ServerPort>) {
    if trigger.triggered().await {
        info!("Termination requested, no longer accepting connections");
        server.set_keep_alives_enabled(false);
        server.close();
    } else {
        debug!("termination trigger went away without firing");
    }
    trigger.unregister();
}
