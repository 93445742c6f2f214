//! `Router` dispatches requests to handlers through prefix-scoped middleware.
//!
//! Routes are kept in one segment trie per HTTP method. Middleware lives in a
//! separate trie keyed by path prefix: every middleware registered on a node
//! that a request path walks through is part of that request's chain, the
//! broadest prefix first.
//!
//! The registered path, against which the router matches incoming requests, can
//! contain two types of parameters:
//! ```ignore
//!  Syntax    Type
//!  :name     named parameter
//!  *name     catch-all parameter
//! ```
//!
//! Named parameters match exactly one path segment:
//! ```ignore
//!  Path: /blog/:category/:post
//!
//!  Requests:
//!   /blog/rust/request-routers            match: category="rust", post="request-routers"
//!   /blog/rust/request-routers/           match: category="rust", post="request-routers"
//!   /blog/rust/                           no match
//!   /blog/rust/request-routers/comments   no match
//! ```
//!
//! Catch-all parameters match the rest of the path and must be the final
//! segment of a pattern. A bare `*` matches without binding a parameter:
//! ```ignore
//!  Path: /files/*filepath
//!
//!  Requests:
//!   /files/LICENSE                      match: filepath="LICENSE"
//!   /files/templates/article.html       match: filepath="templates/article.html"
//!   /files                              no match
//! ```
//!
//! A literal segment always takes precedence over a parameter at the same
//! position, so `/users/me` and `/users/:id` can be registered side by side.
use crate::error::{default_error_handler, ErrorHandler, InsertError};
use crate::group::Group;
use crate::path;
use crate::tree::Node;
use crate::{Context, Error, Handler, Params};

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Router configuration, fixed at construction.
#[derive(Clone, Default)]
pub struct Config {
    /// Writes the response when the handler chain fails.
    ///
    /// Default: [`default_error_handler`](crate::default_error_handler)
    pub error_handler: Option<ErrorHandler>,
}

impl Config {
    /// Sets the error handler.
    pub fn error_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context, Error) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

/// The outcome of resolving a request method and path.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The handler of the matched route, if any.
    pub handler: Option<Handler>,
    /// The parameters of the matched route. Empty on a miss.
    pub params: Params,
    /// Every middleware whose prefix the path walks through, outermost first.
    pub middleware: Vec<Handler>,
}

/// Router is a container which dispatches requests to handlers via
/// configurable routes and prefix-scoped middleware.
///
/// Registration takes `&mut self` and serving takes `&self`: build the router
/// first, then share it (e.g. behind an `Arc`) between request workers.
///
/// ```rust
/// use sprig::{Context, Router};
/// use bytes::Bytes;
/// use http::{Request, StatusCode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.get("/hello/:user", |ctx: &mut Context| {
///     let message = format!("Hello, {}", ctx.param_or("user", "stranger"));
///     ctx.string(message)
/// })?;
///
/// let response = router.handle(Request::get("/hello/ferris").body(Bytes::new())?);
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body(), "Hello, ferris");
///
/// let response = router.handle(Request::get("/nope").body(Bytes::new())?);
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// # Ok(())
/// # }
/// ```
pub struct Router {
    trees: HashMap<Method, Node<Handler>>,
    middleware: Node<Vec<Handler>>,
    error_handler: ErrorHandler,
    not_found: Handler,
}

impl Router {
    /// Creates a router with the default configuration.
    pub fn new() -> Self {
        Router::with_config(Config::default())
    }

    /// Creates a router with the given configuration.
    pub fn with_config(config: Config) -> Self {
        let error_handler: ErrorHandler = match config.error_handler {
            Some(error_handler) => error_handler,
            None => Arc::new(default_error_handler),
        };

        Router {
            trees: HashMap::new(),
            middleware: Node::new(),
            error_handler,
            not_found: Handler::new(not_found),
        }
    }

    /// Registers a handler for the given method and pattern.
    ///
    /// Registering the same pattern twice for a method replaces the handler.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<(), InsertError> {
        check_leading_slash(pattern)?;

        debug!("route {} {}", method, pattern);

        self.trees
            .entry(method)
            .or_default()
            .insert(pattern, handler.into())
    }

    /// Registers middleware at a path prefix.
    ///
    /// The middleware runs, in the given order, for every request whose path
    /// walks through the prefix, whether or not a route matches it.
    pub fn add_middleware<I, H>(&mut self, prefix: &str, handlers: I) -> Result<(), InsertError>
    where
        I: IntoIterator<Item = H>,
        H: Into<Handler>,
    {
        check_leading_slash(prefix)?;

        let middleware = self.middleware.value_or_insert_with(prefix, Vec::new)?;
        let before = middleware.len();
        middleware.extend(handlers.into_iter().map(Into::into));

        debug!("{} middleware at {}", middleware.len() - before, prefix);
        Ok(())
    }

    /// Returns a registrar for routes and middleware below `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group::new(self, prefix.to_owned())
    }

    /// Looks up the handler, parameters and middleware chain for a request.
    ///
    /// `path` is the raw request path. Each segment is percent-decoded before
    /// matching, so parameters hold decoded values.
    ///
    /// ```rust
    /// use sprig::{Context, Router};
    /// use http::Method;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut router = Router::new();
    /// router.add_middleware("/admin", [|ctx: &mut Context| ctx.next()])?;
    /// router.get("/admin/users/:id", |ctx: &mut Context| ctx.string("user"))?;
    ///
    /// let resolved = router.resolve(&Method::GET, "/admin/users/5");
    /// assert!(resolved.handler.is_some());
    /// assert_eq!(resolved.params.get("id"), Some("5"));
    /// assert_eq!(resolved.middleware.len(), 1);
    ///
    /// // middleware still applies to paths without a route
    /// let resolved = router.resolve(&Method::GET, "/admin/nope");
    /// assert!(resolved.handler.is_none());
    /// assert_eq!(resolved.middleware.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn resolve(&self, method: &Method, path: &str) -> Resolved {
        let decoded = path::decoded_segments(path);
        let segments: Vec<&str> = decoded.iter().map(|segment| &**segment).collect();

        let matched = self
            .trees
            .get(method)
            .map(|tree| tree.at_segments(&segments));

        let (handler, params) = match matched {
            Some(Ok(matched)) => (Some(matched.value.clone()), matched.params),
            _ => (None, Params::default()),
        };

        let middleware = self
            .middleware
            .trace_segments(&segments)
            .flatten()
            .cloned()
            .collect();

        Resolved {
            handler,
            params,
            middleware,
        }
    }

    /// Runs the handler chain for a request on a caller-built context.
    ///
    /// The chain is the resolved middleware followed by the route handler, or
    /// by a handler failing with `404 Not Found` if no route matched. If the
    /// chain fails, the configured error handler is called once with the error.
    pub fn dispatch(&self, ctx: &mut Context) {
        let resolved = self.resolve(ctx.method(), ctx.path());

        let mut chain = resolved.middleware;
        chain.push(resolved.handler.unwrap_or_else(|| self.not_found.clone()));

        ctx.params = resolved.params;
        ctx.reset_chain(chain);

        if let Err(err) = ctx.next() {
            (self.error_handler)(ctx, err);
        }
    }

    /// Handles a request and returns the response written by the handlers.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let mut ctx = Context::new(request);
        self.dispatch(&mut ctx);
        ctx.into_response()
    }

    /// Returns the methods with a route matching `path`.
    ///
    /// ```rust
    /// use sprig::{Context, Router};
    /// use http::Method;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut router = Router::new();
    /// router.get("/products", |ctx: &mut Context| ctx.string("all products"))?;
    /// router.post("/products", |ctx: &mut Context| ctx.string("product created"))?;
    ///
    /// let allowed = router.allowed("/products");
    /// assert!(allowed.contains(&Method::GET));
    /// assert!(allowed.contains(&Method::POST));
    /// assert!(!allowed.contains(&Method::PUT));
    /// # Ok(())
    /// # }
    /// ```
    pub fn allowed(&self, path: &str) -> Vec<Method> {
        let decoded = path::decoded_segments(path);
        let segments: Vec<&str> = decoded.iter().map(|segment| &**segment).collect();

        self.trees
            .iter()
            .filter(|(_, tree)| tree.at_segments(&segments).is_ok())
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Register a handler for GET requests
    pub fn get(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), InsertError> {
        self.add_route(Method::GET, pattern, handler)
    }

    /// Register a handler for HEAD requests
    pub fn head(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), InsertError> {
        self.add_route(Method::HEAD, pattern, handler)
    }

    /// Register a handler for POST requests
    pub fn post(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), InsertError> {
        self.add_route(Method::POST, pattern, handler)
    }

    /// Register a handler for PUT requests
    pub fn put(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), InsertError> {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// Register a handler for PATCH requests
    pub fn patch(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<(), InsertError> {
        self.add_route(Method::PATCH, pattern, handler)
    }

    /// Register a handler for DELETE requests
    pub fn delete(
        &mut self,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<(), InsertError> {
        self.add_route(Method::DELETE, pattern, handler)
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("trees", &self.trees)
            .field("middleware", &self.middleware)
            .finish()
    }
}

// The terminal handler of a request no route matched.
fn not_found(ctx: &mut Context) -> Result<(), Error> {
    Err(Error::new(
        StatusCode::NOT_FOUND,
        format!("404 Not Found: {} {}", ctx.method(), ctx.request_uri()),
    ))
}

fn check_leading_slash(pattern: &str) -> Result<(), InsertError> {
    if pattern.starts_with('/') {
        return Ok(());
    }

    Err(InsertError::MissingLeadingSlash {
        pattern: pattern.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(_: &mut Context) -> Result<(), Error> {
        Ok(())
    }

    #[test]
    fn leading_slash() {
        let mut router = Router::new();
        assert_eq!(
            router.get("users", ok),
            Err(InsertError::MissingLeadingSlash {
                pattern: "users".into()
            })
        );
        assert!(router
            .add_middleware("admin", [|ctx: &mut Context| ctx.next()])
            .is_err());
    }

    #[test]
    fn methods_are_independent() {
        let mut router = Router::new();
        router.get("/items", ok).unwrap();

        assert!(router.resolve(&Method::GET, "/items").handler.is_some());
        assert!(router.resolve(&Method::POST, "/items").handler.is_none());
        assert!(router.resolve(&Method::OPTIONS, "/items").handler.is_none());
    }

    #[test]
    fn not_found_message() {
        let request = Request::delete("/missing?x=1").body(Bytes::new()).unwrap();
        let mut ctx = Context::new(request);
        let err = not_found(&mut ctx).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "404 Not Found: DELETE /missing?x=1");
    }
}
