use crate::domain::Result;
use crate::ports::TrackingPort;
use async_trait::async_trait;
use std::sync::Arc;

/// Port for the listener that accepts and serves connections
#[async_trait]
pub trait ServerPort: Send + Sync {
    /// Serve connections until the listener is closed.
    ///
    /// Every connection state transition is reported to `tracker`. Connections
    /// accepted before the listener closed keep being served after this returns.
    async fn serve(&self, tracker: Arc<dyn TrackingPort>) -> Result<()>;

    /// Toggle keep-alive reuse; disabling it winds down idle connections
    fn set_keep_alives_enabled(&self, enabled: bool);

    /// Stop accepting new connections. Safe to call more than once.
    fn close(&self);
}
