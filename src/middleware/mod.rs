//! Ready-made middleware.
//!
//! Every middleware is built from a `Config` with a `Default` impl and returns
//! a [`Handler`](crate::Handler) to register with
//! [`Router::add_middleware`](crate::Router::add_middleware).
//!
//! ```rust
//! use sprig::middleware::{cors, recovery, request_id, request_logger};
//! use sprig::Router;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.add_middleware(
//!     "/",
//!     [
//!         recovery::new(recovery::Config::default()),
//!         request_id::new(request_id::Config::default()),
//!         request_logger::new(request_logger::Config::default()),
//!         cors::new(cors::Config::default()),
//!     ],
//! )?;
//! # Ok(())
//! # }
//! ```
use crate::Context;

use std::sync::Arc;

pub mod cors;
pub mod recovery;
pub mod request_id;
pub mod request_logger;

/// Decides whether a middleware should be skipped for a request.
pub type Skipper = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

fn skipped(skip: &Option<Skipper>, ctx: &Context) -> bool {
    skip.as_ref().is_some_and(|skip| skip(ctx))
}
