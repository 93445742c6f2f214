//! Serves a [`Router`] with `hyper`.
//!
//! ```rust,no_run
//! use hyper::server::conn::http1;
//! use hyper_util::rt::TokioIo;
//! use sprig::{Context, Router, RouterService};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut router = Router::new();
//!     router.get("/", |ctx: &mut Context| ctx.string("Hello, World!"))?;
//!
//!     let service = RouterService::new(router);
//!     let listener = TcpListener::bind(("127.0.0.1", 3000)).await?;
//!
//!     loop {
//!         let (tcp, _) = listener.accept().await?;
//!         let service = service.clone();
//!         tokio::task::spawn(async move {
//!             let _ = http1::Builder::new()
//!                 .serve_connection(TokioIo::new(tcp), service)
//!                 .await;
//!         });
//!     }
//! }
//! ```
use crate::Router;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Full<Bytes>>, hyper::Error>> + Send>>;

/// A `hyper` service dispatching every request through a shared [`Router`].
///
/// The router is frozen once it is wrapped: cloning the service only clones
/// the `Arc`.
#[derive(Clone, Debug)]
pub struct RouterService(pub Arc<Router>);

impl RouterService {
    /// Wraps a fully configured router.
    pub fn new(router: Router) -> Self {
        RouterService(Arc::new(router))
    }
}

impl From<Router> for RouterService {
    fn from(router: Router) -> Self {
        RouterService::new(router)
    }
}

impl Service<Request<Incoming>> for RouterService {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = ServiceFuture;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = self.0.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();

            let response = router.handle(Request::from_parts(parts, body));
            Ok(response.map(Full::new))
        })
    }
}
