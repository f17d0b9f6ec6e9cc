use hyper::body::{Body as HttpBody, Bytes, Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use super::io::PendingIdle;
use crate::ports::Body;

/// State change of a single connection, queued in order for its serving task.
pub(super) enum Transition {
    /// A request arrived; the sender waits until the tracker has recorded it.
    Active(oneshot::Sender<()>),
    /// The response was written out and flushed to the socket.
    Idle,
}

/// Response body that marks the response as finished once it is exhausted or dropped.
///
/// Idle itself is reported by the socket, after the finished response is flushed.
pub(super) struct ReportingBody {
    inner: Body,
    pending: Option<PendingIdle>,
}

impl ReportingBody {
    pub(super) fn new(inner: Body, pending: PendingIdle) -> Self {
        Self {
            inner,
            pending: Some(pending),
        }
    }

    fn finish(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.mark();
        }
    }
}

impl HttpBody for ReportingBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(None) = polled {
            this.finish();
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for ReportingBody {
    fn drop(&mut self) {
        self.finish();
    }
}
