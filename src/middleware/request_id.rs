//! Tags every request with an id.
use super::{skipped, Skipper};
use crate::{Error, Handler};

use http::header::{HeaderName, HeaderValue};
use std::fmt;
use std::sync::Arc;

/// The context store key the request id is saved under, as a `String`.
pub const REQUEST_ID: &str = "request-id";

/// The default header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a new request id.
pub type Generator = Arc<dyn Fn() -> Result<String, Error> + Send + Sync>;

/// Request id configuration.
#[derive(Clone)]
pub struct Config {
    /// Skips the middleware when it returns `true`.
    ///
    /// Optional. Default: `None`
    pub skip: Option<Skipper>,

    /// The header an incoming id is read from and the id is echoed in.
    ///
    /// Optional. Default: `x-request-id`
    pub header: HeaderName,

    /// Generates an id for requests that do not carry one.
    ///
    /// Optional. Default: a random UUID v4
    pub generator: Generator,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            skip: None,
            header: HeaderName::from_static(X_REQUEST_ID),
            generator: Arc::new(|| Ok(uuid::Uuid::new_v4().to_string())),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("skip", &self.skip.is_some())
            .field("header", &self.header)
            .finish()
    }
}

/// Creates the request id middleware.
///
/// Reuses the id of the incoming request header, or generates one. The id is
/// stored in the context under [`REQUEST_ID`] and set on the response header.
pub fn new(config: Config) -> Handler {
    Handler::new(move |ctx| {
        if skipped(&config.skip, ctx) {
            return ctx.next();
        }

        let id = match ctx.header(&config.header) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => (config.generator)()?,
        };

        let value = HeaderValue::from_str(&id).map_err(Error::other)?;
        ctx.set(REQUEST_ID, id);
        ctx.set_header(config.header.clone(), value);

        ctx.next()
    })
}
