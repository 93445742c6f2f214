//! Turns panics in later handlers into errors.
use super::{skipped, Skipper};
use crate::{Error, Handler};

use std::panic::{self, AssertUnwindSafe};

/// Recovery configuration.
#[derive(Clone, Default)]
pub struct Config {
    /// Skips the middleware when it returns `true`.
    ///
    /// Optional. Default: `None`
    pub skip: Option<Skipper>,
}

/// Creates the recovery middleware.
///
/// A panic raised further down the chain is caught and returned as an
/// [`Error::Other`] carrying the panic message, so the error handler answers
/// the request instead of the worker unwinding.
pub fn new(config: Config) -> Handler {
    Handler::new(move |ctx| {
        if skipped(&config.skip, ctx) {
            return ctx.next();
        }

        match panic::catch_unwind(AssertUnwindSafe(|| ctx.next())) {
            Ok(result) => result,
            Err(payload) => Err(Error::from_panic(payload)),
        }
    })
}
