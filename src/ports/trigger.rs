use async_trait::async_trait;

/// Port for the event that starts a shutdown (usually an interrupt signal)
#[async_trait]
pub trait TerminationTrigger: Send {
    /// Wait for the next trigger.
    ///
    /// Returns `false` when the source can no longer fire.
    async fn triggered(&mut self) -> bool;

    /// Drop interest in further triggers
    fn unregister(&mut self);
}
