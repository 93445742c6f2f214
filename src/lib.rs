//! An embeddable HTTP request router with prefix-scoped middleware.
//!
//! Routes are matched with one segment trie per HTTP method. Middleware is
//! registered on path prefixes and wraps every request whose path walks
//! through that prefix, including requests that match no route, so a
//! `404 Not Found` passes through the same chain as any other response.
//!
//! ```rust
//! use sprig::{Config, Context, Error, Router};
//! use bytes::Bytes;
//! use http::{Request, StatusCode};
//!
//! fn auth(ctx: &mut Context) -> Result<(), Error> {
//!     match ctx.header("authorization") {
//!         Some("secret") => ctx.next(),
//!         _ => Err(Error::new(StatusCode::UNAUTHORIZED, "401 Unauthorized")),
//!     }
//! }
//!
//! fn user(ctx: &mut Context) -> Result<(), Error> {
//!     let message = format!("user {}", ctx.param_or("id", "?"));
//!     ctx.string(message)
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default().error_handler(|ctx, err| {
//!     let _ = ctx.status(err.status()).string(format!("oops: {}", err));
//! });
//!
//! let mut router = Router::with_config(config);
//! router.add_middleware("/admin", [auth])?;
//! router.get("/admin/users/:id", user)?;
//!
//! let request = Request::get("/admin/users/5")
//!     .header("authorization", "secret")
//!     .body(Bytes::new())?;
//! let response = router.handle(request);
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body(), "user 5");
//!
//! let response = router.handle(Request::get("/admin/users/5").body(Bytes::new())?);
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! assert_eq!(response.body(), "oops: 401 Unauthorized");
//! # Ok(())
//! # }
//! ```
#![deny(clippy::all)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod context;
mod error;
mod group;
mod handler;
mod params;
mod path;
mod router;
mod tree;

pub mod middleware;

#[cfg(feature = "hyper-server")]
mod service;

pub use context::Context;
pub use error::{default_error_handler, Error, ErrorHandler, InsertError, MatchError};
pub use group::Group;
pub use handler::Handler;
pub use params::{Params, ParamsIter};
pub use router::{Config, Resolved, Router};
pub use tree::{Match, Node};

#[cfg(feature = "hyper-server")]
pub use service::RouterService;
