use crate::Context;

use http::StatusCode;
use std::any::Any;
use std::sync::Arc;
use std::{error, fmt};

/// An error returned from a handler.
///
/// Handlers either fail with a status code and a message meant for the
/// client, or with an arbitrary error that is reported as an internal
/// server error.
///
/// ```
/// use sprig::Error;
/// use http::StatusCode;
///
/// let err = Error::new(StatusCode::FORBIDDEN, "403 Forbidden");
/// assert_eq!(err.status(), StatusCode::FORBIDDEN);
/// assert_eq!(err.to_string(), "403 Forbidden");
///
/// let err = Error::other(std::io::Error::other("disk on fire"));
/// assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Debug)]
pub enum Error {
    /// An error with an HTTP status and a message to show.
    Http {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The message to show.
        message: String,
    },
    /// Any other error. Treated as an internal server error.
    Other(Box<dyn error::Error + Send + Sync>),
}

impl Error {
    /// Creates an error carrying an HTTP status and a message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Error::Http {
            status,
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error.
    pub fn other(err: impl Into<Box<dyn error::Error + Send + Sync>>) -> Self {
        Error::Other(err.into())
    }

    /// The HTTP status this error should be answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if this error is a `404 Not Found`, including a routing miss.
    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }

    // Converts a panic payload caught by `catch_unwind` into an error.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_owned(),
                Err(_) => "handler panicked".to_owned(),
            },
        };

        Error::Other(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { message, .. } => f.write_str(message),
            Self::Other(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Http { .. } => None,
            Self::Other(err) => Some(&**err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::other(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::other(err)
    }
}

/// A function that writes the response for an error returned by the handler chain.
pub type ErrorHandler = Arc<dyn Fn(&mut Context, Error) + Send + Sync>;

/// The error handler used when none is configured.
///
/// Logs the failure, then answers with the error's status and message, or with
/// `500 Internal Server Error` and the error's text for opaque errors.
pub fn default_error_handler(ctx: &mut Context, err: Error) {
    error!(
        target: "sprig::http_error",
        "{} {} - Error {}",
        ctx.method(),
        ctx.request_uri(),
        err
    );

    let message = err.to_string();
    if let Err(err) = ctx.status(err.status()).string(message) {
        error!(
            target: "sprig::http_error",
            "failed to write error response: {}",
            err
        );
    }
}

/// Represents errors that can occur when registering a route or middleware.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum InsertError {
    /// Route patterns and middleware prefixes must begin with `/`.
    MissingLeadingSlash {
        /// The offending pattern.
        pattern: String,
    },
    /// Catch-all parameters are only allowed at the end of a route.
    InvalidCatchAll,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLeadingSlash { pattern } => {
                write!(f, "path must begin with '/' in path '{}'", pattern)
            }
            Self::InvalidCatchAll => write!(
                f,
                "catch-all parameters are only allowed at the end of a route"
            ),
        }
    }
}

impl error::Error for InsertError {}

/// A failed match attempt.
///
/// ```
/// use sprig::{MatchError, Node};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = Node::new();
/// tree.insert("/home", "Welcome!")?;
///
/// // no routes match
/// if let Err(err) = tree.at("/foobar") {
///     assert_eq!(err, MatchError::NotFound);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchError {
    /// No matching route was found.
    NotFound,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matching route not found")
    }
}

impl error::Error for MatchError {}
