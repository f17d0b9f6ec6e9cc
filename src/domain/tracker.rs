use crate::domain::TrackerOutcome;
use crate::ports::{TrackedConnection, TrackingPort};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Depth 1 keeps the server close to a rendezvous with the tracker: a
/// connection task blocks until its previous transition has been picked up.
const EVENT_QUEUE_DEPTH: usize = 1;

enum TrackerEvent {
    Active(Arc<dyn TrackedConnection>),
    Idle(Arc<dyn TrackedConnection>),
    Drain(oneshot::Sender<()>),
}

/// Owns the set of active connections.
///
/// The set is only ever touched from the task started by [`ConnectionTracker::spawn`];
/// everybody else talks to it through a [`TrackerHandle`]. The task stops on the
/// first of: the set empties while a drain is pending, a drain is requested on an
/// empty set, or a force-kill. A force-kill always takes priority over queued events.
pub struct ConnectionTracker {
    connections: HashMap<Uuid, Arc<dyn TrackedConnection>>,
    drain: Option<oneshot::Sender<()>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            drain: None,
        }
    }

    /// Start the tracker task
    pub fn spawn(self) -> (TrackerHandle, JoinHandle<TrackerOutcome>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let kill = Arc::new(Notify::new());
        let task = tokio::spawn(self.run(events_rx, kill.clone()));

        (TrackerHandle { events: events_tx, kill }, task)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    async fn run(mut self, mut events: mpsc::Receiver<TrackerEvent>, kill: Arc<Notify>) -> TrackerOutcome {
        let outcome = loop {
            tokio::select! {
                biased;

                _ = kill.notified() => break self.kill_all(),
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(outcome) = self.apply(event) {
                            break outcome;
                        }
                    }
                    None => break TrackerOutcome::Abandoned { remaining: self.len() },
                },
            }
        };

        info!(?outcome, "Connection tracker stopped");
        outcome
    }

    fn apply(&mut self, event: TrackerEvent) -> Option<TrackerOutcome> {
        match event {
            TrackerEvent::Active(conn) => {
                let id = conn.id();
                if self.connections.insert(id, conn).is_none() {
                    trace!(connection = %id, active = self.len(), "connection active");
                }
                None
            }
            TrackerEvent::Idle(conn) => {
                let id = conn.id();
                if self.connections.remove(&id).is_some() {
                    trace!(connection = %id, active = self.len(), "connection idle");
                }
                self.fulfill_drain()
            }
            TrackerEvent::Drain(ack) => {
                if self.drain.replace(ack).is_some() {
                    debug!("replacing outstanding drain request");
                }
                debug!(active = self.len(), "drain requested");
                self.fulfill_drain()
            }
        }
    }

    fn fulfill_drain(&mut self) -> Option<TrackerOutcome> {
        if !self.connections.is_empty() {
            return None;
        }
        let ack = self.drain.take()?;
        // The requester may have stopped waiting already.
        let _ = ack.send(());
        Some(TrackerOutcome::Drained)
    }

    fn kill_all(&mut self) -> TrackerOutcome {
        let closed = self.connections.len();
        for (id, conn) in self.connections.drain() {
            match conn.peer_addr() {
                Some(peer) => debug!(connection = %id, %peer, "force closing connection"),
                None => debug!(connection = %id, "force closing connection"),
            }
            conn.force_close();
        }
        TrackerOutcome::Killed { closed }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap, cloneable sender side of a running [`ConnectionTracker`].
///
/// Once the tracker has stopped every event is silently dropped.
#[derive(Clone)]
pub struct TrackerHandle {
    events: mpsc::Sender<TrackerEvent>,
    kill: Arc<Notify>,
}

impl TrackerHandle {
    async fn send(&self, event: TrackerEvent) -> bool {
        self.events.send(event).await.is_ok()
    }
}

#[async_trait]
impl TrackingPort for TrackerHandle {
    async fn connection_active(&self, conn: Arc<dyn TrackedConnection>) {
        if !self.send(TrackerEvent::Active(conn)).await {
            trace!("tracker stopped, dropping active transition");
        }
    }

    async fn connection_idle(&self, conn: Arc<dyn TrackedConnection>) {
        if !self.send(TrackerEvent::Idle(conn)).await {
            trace!("tracker stopped, dropping idle transition");
        }
    }

    async fn drained(&self) {
        let (ack, done) = oneshot::channel();
        if !self.send(TrackerEvent::Drain(ack)).await {
            return;
        }
        // A dropped ack means the tracker was killed before the set emptied.
        let _ = done.await;
    }

    fn force_kill(&self) {
        self.kill.notify_one();
    }
}
