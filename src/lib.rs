//! Graceful shutdown for an HTTP/1 listener.
//!
//! On the termination trigger the listener stops accepting, in-flight
//! connections get to finish, and whatever is still open when the drain
//! timeout elapses is closed forcibly.

pub mod adapters;
pub mod domain;
pub mod ports;

use std::sync::Arc;
use std::time::Duration;

use adapters::{HyperServer, SignalTrigger};
use domain::{Result, ShutdownOrchestrator};
use ports::{RequestHandler, ServerPort, TerminationTrigger};

/// Serve `handler` on `addr` until interrupted, then drain.
///
/// An empty `addr` binds the default HTTP port and a zero `timeout` waits for
/// in-flight requests forever. A clean shutdown returns
/// [`GracefulError::ServerClosed`](domain::GracefulError::ServerClosed); a bind
/// failure returns before anything is served.
pub async fn run(addr: &str, timeout: Duration, handler: Arc<dyn RequestHandler>) -> Result<()> {
    let server = Arc::new(HyperServer::bind(addr, handler).await?);
    let trigger = SignalTrigger::new(false)?;
    serve(server, timeout, Box::new(trigger)).await
}

/// Serve an already bound server until `trigger` fires, then drain.
pub async fn serve(server: Arc<dyn ServerPort>, timeout: Duration, trigger: Box<dyn TerminationTrigger>) -> Result<()> {
    ShutdownOrchestrator::new(server, timeout).run(trigger).await
}
