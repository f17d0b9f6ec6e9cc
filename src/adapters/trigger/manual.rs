use crate::ports::TerminationTrigger;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// In-process trigger, fired through a [`ManualTriggerHandle`].
///
/// Useful when shutdown is decided by the embedding program rather than a signal.
pub struct ManualTrigger {
    fires: mpsc::Receiver<()>,
}

#[derive(Clone)]
pub struct ManualTriggerHandle {
    tx: mpsc::Sender<()>,
}

impl ManualTrigger {
    pub fn new() -> (Self, ManualTriggerHandle) {
        let (tx, fires) = mpsc::channel(1);
        (Self { fires }, ManualTriggerHandle { tx })
    }
}

impl ManualTriggerHandle {
    /// Request a shutdown. Returns `false` once the trigger was unregistered.
    pub fn fire(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            // A fire is already pending
            Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        }
    }
}

#[async_trait]
impl TerminationTrigger for ManualTrigger {
    async fn triggered(&mut self) -> bool {
        self.fires.recv().await.is_some()
    }

    fn unregister(&mut self) {
        self.fires.close();
    }
}
