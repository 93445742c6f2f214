use crate::error::InsertError;
use crate::{Handler, Router};

use http::Method;

/// Registers routes and middleware below a common path prefix.
///
/// ```rust
/// use sprig::{Context, Router};
/// use http::Method;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
///
/// let mut api = router.group("/api");
/// api.middleware([|ctx: &mut Context| ctx.next()])?;
///
/// let mut v1 = api.group("/v1");
/// v1.get("/users/:id", |ctx: &mut Context| ctx.string("user"))?;
///
/// let resolved = router.resolve(&Method::GET, "/api/v1/users/7");
/// assert!(resolved.handler.is_some());
/// assert_eq!(resolved.params.get("id"), Some("7"));
/// assert_eq!(resolved.middleware.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Group<'r> {
    router: &'r mut Router,
    prefix: String,
}

impl<'r> Group<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String) -> Self {
        Group { router, prefix }
    }

    /// The full prefix of this group.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Creates a nested group whose prefix extends this one.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let prefix = format!("{}{}", self.prefix, prefix);
        Group::new(&mut *self.router, prefix)
    }

    /// Registers middleware at the group prefix.
    pub fn middleware<I, H>(&mut self, handlers: I) -> Result<(), InsertError>
    where
        I: IntoIterator<Item = H>,
        H: Into<Handler>,
    {
        let prefix = match self.prefix.as_str() {
            "" => "/",
            prefix => prefix,
        };

        self.router.add_middleware(prefix, handlers)
    }

    /// Registers a handler for the given method and a pattern relative to the group prefix.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Into<Handler>,
    ) -> Result<(), InsertError> {
        let pattern = format!("{}{}", self.prefix, pattern);
        self.router.add_route(method, &pattern, handler)
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
