use async_trait::async_trait;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tracing::{debug, info};

use super::body::{ReportingBody, Transition};
use super::connection::HyperConnection;
use super::io::{FlushReportingIo, PendingIdle};
use crate::domain::{normalize_bind_addr, GracefulError, Result};
use crate::ports::{RequestHandler, ServerPort, TrackedConnection, TrackingPort};

/// HTTP/1 server on a TCP listener, serving every connection in its own task.
pub struct HyperServer {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    handler: Arc<dyn RequestHandler>,
    closed: watch::Sender<bool>,
    keep_alive: watch::Sender<bool>,
}

impl HyperServer {
    /// Bind the listener. An empty `addr` binds the default HTTP port.
    pub async fn bind(addr: &str, handler: Arc<dyn RequestHandler>) -> Result<Self> {
        let addr = normalize_bind_addr(addr);
        let bind_error = |e: io::Error| GracefulError::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        };

        let listener = TcpListener::bind(&addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        info!(%local_addr, "Listening");

        Ok(Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            handler,
            closed: watch::channel(false).0,
            keep_alive: watch::channel(true).0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr, tracker: Arc<dyn TrackingPort>) {
        let conn = Arc::new(HyperConnection::new(peer));
        log::debug!("Accepted connection {} from {}", conn.id(), peer);

        tokio::spawn(serve_connection(
            stream,
            conn,
            self.handler.clone(),
            tracker,
            self.keep_alive.subscribe(),
        ));
    }
}

#[async_trait]
impl ServerPort for HyperServer {
    async fn serve(&self, tracker: Arc<dyn TrackingPort>) -> Result<()> {
        let listener = self.listener.lock().await.take().ok_or(GracefulError::AlreadyServing)?;
        let mut closed = self.closed.subscribe();

        while !*closed.borrow_and_update() {
            tokio::select! {
                changed = closed.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer, tracker.clone()),
                    Err(e) if is_transient(&e) => log::debug!("Dropped connection during accept: {}", e),
                    Err(e) => return Err(GracefulError::Accept(e.to_string())),
                },
            }
        }

        drop(listener);
        debug!(addr = %self.local_addr, "listener released");
        Err(GracefulError::ServerClosed)
    }

    fn set_keep_alives_enabled(&self, enabled: bool) {
        let changed = self.keep_alive.send_if_modified(|current| {
            let changed = *current != enabled;
            *current = enabled;
            changed
        });
        if changed {
            debug!(enabled, "keep-alive toggled");
        }
    }

    fn close(&self) {
        let first = self.closed.send_if_modified(|closed| !std::mem::replace(closed, true));
        if first {
            info!(addr = %self.local_addr, "Closing listener");
        } else {
            debug!("listener already closed");
        }
    }
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset | io::ErrorKind::Interrupted
    )
}

/// Serve one connection.
///
/// Transitions are queued by the service and the socket, then forwarded to the
/// tracker from here one at a time, so the tracker sees them in the order they
/// happened. A response counts as idle once it has been flushed, and the end
/// of the connection is reported as idle too.
async fn serve_connection(
    stream: TcpStream,
    conn: Arc<HyperConnection>,
    handler: Arc<dyn RequestHandler>,
    tracker: Arc<dyn TrackingPort>,
    mut keep_alive: watch::Receiver<bool>,
) {
    let tracked: Arc<dyn TrackedConnection> = conn.clone();
    let (transitions_tx, mut transitions) = mpsc::unbounded_channel();
    let pending = PendingIdle::default();
    let io = FlushReportingIo::new(stream, pending.clone(), transitions_tx.clone());

    let service = service_fn(move |req| {
        let transitions = transitions_tx.clone();
        let pending = pending.clone();
        let handler = handler.clone();
        async move {
            // The previous response may still be flushing; this request keeps the connection active.
            pending.clear();
            let (ack, recorded) = oneshot::channel();
            if transitions.send(Transition::Active(ack)).is_ok() {
                let _ = recorded.await;
            }
            let response = handler.handle(req).await;
            Ok::<_, Infallible>(response.map(|body| ReportingBody::new(body, pending)))
        }
    });

    let reuse = *keep_alive.borrow_and_update();
    let mut connection = Box::pin(
        http1::Builder::new()
            .keep_alive(reuse)
            .serve_connection(TokioIo::new(io), service),
    );
    let mut winding_down = !reuse;

    loop {
        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    log::debug!("Connection {} from {} failed: {}", conn.id(), conn.peer(), e);
                }
                break;
            }
            Some(transition) = transitions.recv() => match transition {
                Transition::Active(ack) => {
                    tracker.connection_active(tracked.clone()).await;
                    let _ = ack.send(());
                }
                Transition::Idle => tracker.connection_idle(tracked.clone()).await,
            },
            changed = keep_alive.changed(), if !winding_down => match changed {
                Ok(()) if !*keep_alive.borrow_and_update() => {
                    // Idle connections close now, busy ones after the current response.
                    connection.as_mut().graceful_shutdown();
                    winding_down = true;
                }
                Ok(()) => {}
                Err(_) => winding_down = true,
            },
            _ = conn.killed() => {
                log::debug!("Connection {} from {} force closed", conn.id(), conn.peer());
                break;
            }
        }
    }

    drop(connection);
    tracker.connection_idle(tracked).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticResponder;
    use std::time::Duration;

    fn responder() -> Arc<dyn RequestHandler> {
        Arc::new(StaticResponder::new("ok", Duration::ZERO))
    }

    #[tokio::test]
    async fn test_bind_reports_address_in_use() {
        let first = HyperServer::bind("127.0.0.1:0", responder()).await.unwrap();
        let taken = first.local_addr().to_string();

        match HyperServer::bind(&taken, responder()).await {
            Err(GracefulError::Bind { addr, .. }) => assert_eq!(addr, taken),
            Err(other) => panic!("expected a bind error, got {}", other),
            Ok(_) => panic!("binding a taken port should fail"),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let server = HyperServer::bind("127.0.0.1:0", responder()).await.unwrap();

        server.close();
        server.close();

        assert!(*server.closed.borrow());
    }

    #[tokio::test]
    async fn test_serve_after_close_returns_server_closed() {
        let server = HyperServer::bind("127.0.0.1:0", responder()).await.unwrap();
        let (tracker, _task) = crate::domain::ConnectionTracker::new().spawn();

        server.close();

        assert_eq!(server.serve(Arc::new(tracker)).await, Err(GracefulError::ServerClosed));
    }

    #[tokio::test]
    async fn test_serving_twice_is_rejected() {
        let server = HyperServer::bind("127.0.0.1:0", responder()).await.unwrap();
        let (tracker, _task) = crate::domain::ConnectionTracker::new().spawn();
        let tracker: Arc<dyn TrackingPort> = Arc::new(tracker);

        server.close();
        assert_eq!(server.serve(tracker.clone()).await, Err(GracefulError::ServerClosed));
        assert_eq!(server.serve(tracker).await, Err(GracefulError::AlreadyServing));
    }

    #[tokio::test]
    async fn test_keep_alive_toggle_only_notifies_on_change() {
        let server = HyperServer::bind("127.0.0.1:0", responder()).await.unwrap();
        let mut keep_alive = server.keep_alive.subscribe();

        server.set_keep_alives_enabled(true);
        assert!(!keep_alive.has_changed().unwrap());

        server.set_keep_alives_enabled(false);
        assert!(keep_alive.has_changed().unwrap());
        assert!(!*keep_alive.borrow_and_update());
    }
}
