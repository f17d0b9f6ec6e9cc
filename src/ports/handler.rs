use async_trait::async_trait;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};

pub type Body = BoxBody<Bytes, hyper::Error>;

/// Port for the application logic answering each request
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, req: Request<Incoming>) -> Response<Body>;
}
