use crate::ports::TrackedConnection;
use std::net::SocketAddr;
use tokio::sync::Notify;
use uuid::Uuid;

/// Tracker-side view of a connection served by [`HyperServer`](super::HyperServer).
///
/// The serving task owns the socket; this only carries the identity and a
/// kill switch the serving task listens on.
pub struct HyperConnection {
    id: Uuid,
    peer: SocketAddr,
    kill: Notify,
}

impl HyperConnection {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            kill: Notify::new(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Resolves once [`TrackedConnection::force_close`] was called, even if
    /// that happened before this was awaited.
    pub async fn killed(&self) {
        self.kill.notified().await
    }
}

impl TrackedConnection for HyperConnection {
    fn id(&self) -> Uuid {
        self.id
    }

    fn force_close(&self) {
        self.kill.notify_one();
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
