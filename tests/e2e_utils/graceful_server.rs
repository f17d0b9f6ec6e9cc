#![cfg(test)]
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use graceful::adapters::{HyperServer, ManualTrigger, ManualTriggerHandle, StaticResponder};
use graceful::domain::Result;

pub const RESPONSE_BODY: &str = "hello from graceful\n";

pub struct TestGracefulServer {
    addr: SocketAddr,
    trigger: ManualTriggerHandle,
    server_handle: JoinHandle<Result<()>>,
}

impl TestGracefulServer {
    /// Start a server whose handler answers after `response_delay`, draining for at most `drain_timeout`.
    pub async fn start(response_delay: Duration, drain_timeout: Duration) -> Result<Self> {
        let handler = Arc::new(StaticResponder::new(RESPONSE_BODY, response_delay));
        let server = Arc::new(HyperServer::bind("127.0.0.1:0", handler).await?);
        let addr = server.local_addr();

        let (trigger, trigger_handle) = ManualTrigger::new();
        let server_handle = tokio::spawn(graceful::serve(server, drain_timeout, Box::new(trigger)));

        Ok(Self {
            addr,
            trigger: trigger_handle,
            server_handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&self) -> bool {
        self.trigger.fire()
    }

    /// Wait for the serving session to finish and return its result.
    pub async fn finished(self) -> Result<()> {
        tokio::time::timeout(Duration::from_secs(10), self.server_handle)
            .await
            .expect("server did not finish shutting down")
            .expect("server task panicked")
    }
}
