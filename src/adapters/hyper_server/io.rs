use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::mpsc;

use super::body::Transition;

/// Set once a response body is done, taken by the flush that writes it out.
#[derive(Clone, Default)]
pub(super) struct PendingIdle(Arc<AtomicBool>);

impl PendingIdle {
    pub(super) fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// A new request arrived, so the connection stays active.
    pub(super) fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub(super) fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Socket wrapper reporting [`Transition::Idle`] once a finished response has
/// been flushed.
///
/// hyper only flushes the transport after its own write buffer is empty, so a
/// successful flush following the end of a body means every byte of that
/// response reached the socket.
pub(super) struct FlushReportingIo<T> {
    inner: T,
    pending: PendingIdle,
    transitions: mpsc::UnboundedSender<Transition>,
}

impl<T> FlushReportingIo<T> {
    pub(super) fn new(inner: T, pending: PendingIdle, transitions: mpsc::UnboundedSender<Transition>) -> Self {
        Self {
            inner,
            pending,
            transitions,
        }
    }
}

impl<T: AsyncRead + Unpin> AsyncRead for FlushReportingIo<T> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<T: AsyncWrite + Unpin> AsyncWrite for FlushReportingIo<T> {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let flushed = Pin::new(&mut self.inner).poll_flush(cx);
        if let Poll::Ready(Ok(())) = flushed {
            if self.pending.take() {
                // The serving task is gone when the connection already ended.
                let _ = self.transitions.send(Transition::Idle);
            }
        }
        flushed
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
