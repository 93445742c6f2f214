//! Logs every request.
use super::{skipped, Skipper};
use crate::{Context, Handler};

use std::fmt;
use std::sync::Arc;

/// Formats a request into a log line.
pub type Formatter = Arc<dyn Fn(&Context) -> String + Send + Sync>;

/// Request logger configuration.
#[derive(Clone)]
pub struct Config {
    /// Skips the middleware when it returns `true`.
    ///
    /// Optional. Default: `None`
    pub skip: Option<Skipper>,

    /// Formats the log line.
    ///
    /// Optional. Default: [`default_formatter`]
    pub formatter: Formatter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            skip: None,
            formatter: Arc::new(default_formatter),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("skip", &self.skip.is_some())
            .finish()
    }
}

/// `METHOD request-uri -Header {headers}`
pub fn default_formatter(ctx: &Context) -> String {
    format!(
        "{} {} -Header {:?}",
        ctx.method(),
        ctx.request_uri(),
        ctx.headers()
    )
}

/// Creates the request logger middleware. Lines are logged at `info` level.
pub fn new(config: Config) -> Handler {
    Handler::new(move |ctx| {
        if !skipped(&config.skip, ctx) {
            let line = (config.formatter)(ctx);
            info!(target: "sprig::request", "{}", line);
        }

        ctx.next()
    })
}
