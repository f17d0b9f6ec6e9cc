use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{Body, RequestHandler};

/// Answers every request with the same body, optionally after a delay.
///
/// The delay makes in-flight requests easy to observe during a drain.
pub struct StaticResponder {
    body: Bytes,
    delay: Duration,
}

impl StaticResponder {
    pub fn new(body: impl Into<Bytes>, delay: Duration) -> Self {
        Self {
            body: body.into(),
            delay,
        }
    }
}

#[async_trait]
impl RequestHandler for StaticResponder {
    async fn handle(&self, req: Request<Incoming>) -> Response<Body> {
        log::debug!("{} {}", req.method(), req.uri());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        Response::new(Full::new(self.body.clone()).map_err(|never| match never {}).boxed())
    }
}
