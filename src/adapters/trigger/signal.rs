use crate::domain::{GracefulError, Result};
use crate::ports::TerminationTrigger;
use async_trait::async_trait;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Fires on SIGINT (Ctrl+C), and on SIGTERM when asked to on Unix.
///
/// On Unix both signals are caught from construction on, before the first wait.
/// Once unregistered, later signals are swallowed instead of killing the process.
pub struct SignalTrigger {
    registered: bool,
    #[cfg(unix)]
    interrupt: Option<Signal>,
    #[cfg(unix)]
    terminate: Option<Signal>,
}

impl SignalTrigger {
    pub fn new(handle_sigterm: bool) -> Result<Self> {
        #[cfg(unix)]
        let interrupt = Some(listen(SignalKind::interrupt())?);
        #[cfg(unix)]
        let terminate = if handle_sigterm {
            Some(listen(SignalKind::terminate())?)
        } else {
            None
        };
        #[cfg(not(unix))]
        let _ = handle_sigterm;

        Ok(Self {
            registered: true,
            #[cfg(unix)]
            interrupt,
            #[cfg(unix)]
            terminate,
        })
    }

    #[cfg(unix)]
    async fn wait_for_signal(&mut self) -> bool {
        let Self {
            interrupt, terminate, ..
        } = self;
        let Some(interrupt) = interrupt.as_mut() else {
            return false;
        };

        match terminate.as_mut() {
            Some(terminate) => tokio::select! {
                received = interrupt.recv() => received_signal("SIGINT", received),
                received = terminate.recv() => received_signal("SIGTERM", received),
            },
            None => received_signal("SIGINT", interrupt.recv().await),
        }
    }

    #[cfg(not(unix))]
    async fn wait_for_signal(&mut self) -> bool {
        interrupted(tokio::signal::ctrl_c().await)
    }
}

#[cfg(unix)]
fn listen(kind: SignalKind) -> Result<Signal> {
    signal(kind).map_err(|e| GracefulError::Signal(e.to_string()))
}

#[cfg(unix)]
fn received_signal(name: &'static str, received: Option<()>) -> bool {
    match received {
        Some(()) => {
            info!(signal = name, "Signal received");
            true
        }
        None => {
            warn!(signal = name, "Signal stream closed");
            false
        }
    }
}

#[cfg(not(unix))]
fn interrupted(res: std::io::Result<()>) -> bool {
    match res {
        Ok(()) => {
            info!(signal = "SIGINT", "Signal received");
            true
        }
        Err(e) => {
            warn!("Failed to listen for interrupts: {}", e);
            false
        }
    }
}

#[async_trait]
impl TerminationTrigger for SignalTrigger {
    async fn triggered(&mut self) -> bool {
        if !self.registered {
            return false;
        }
        self.wait_for_signal().await
    }

    fn unregister(&mut self) {
        self.registered = false;
        #[cfg(unix)]
        {
            self.interrupt = None;
            self.terminate = None;
        }
    }
}
