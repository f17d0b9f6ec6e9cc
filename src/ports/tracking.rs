use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

/// A live connection as seen by the tracker: an identity and a way to kill it.
pub trait TrackedConnection: Send + Sync {
    fn id(&self) -> Uuid;

    /// Forcibly close the connection, abandoning any in-flight request.
    fn force_close(&self);

    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

/// Port for feeding connection state transitions to the tracker
#[async_trait]
pub trait TrackingPort: Send + Sync {
    /// The connection started processing a request
    async fn connection_active(&self, conn: Arc<dyn TrackedConnection>);

    /// The connection finished its request, or was closed
    async fn connection_idle(&self, conn: Arc<dyn TrackedConnection>);

    /// Resolves once no connection is active anymore
    async fn drained(&self);

    /// Close every remaining connection and stop tracking; does not wait
    fn force_kill(&self);
}
