use crate::{Error, Handler, Params};

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::request::Parts;
use http::{Method, Request, Response, StatusCode, Uri};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream; charset=utf-8";

/// The state of a single request as it travels through the handler chain.
///
/// A context is created fresh for every request. It owns the request, the
/// parameters extracted by the router, a typed key/value store shared by all
/// handlers of the request, and the response being built.
///
/// ```rust
/// use sprig::{Context, Router};
/// use bytes::Bytes;
/// use http::{Request, StatusCode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.add_middleware("/", [|ctx: &mut Context| {
///     ctx.set("user", String::from("ferris"));
///     ctx.next()
/// }])?;
/// router.get("/hello/:greeting", |ctx: &mut Context| {
///     let user = ctx.get::<String>("user").cloned().unwrap_or_default();
///     let greeting = ctx.param_or("greeting", "hello").to_owned();
///     ctx.status(StatusCode::CREATED).string(format!("{greeting}, {user}"))
/// })?;
///
/// let response = router.handle(Request::get("/hello/hi").body(Bytes::new())?);
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body(), "hi, ferris");
/// # Ok(())
/// # }
/// ```
pub struct Context {
    request: Parts,
    body: Bytes,

    pub(crate) params: Params,
    store: HashMap<String, Box<dyn Any + Send + Sync>>,

    status: StatusCode,
    headers: HeaderMap,
    response: Bytes,

    chain: Vec<Handler>,
    cursor: usize,
}

impl Context {
    /// Creates the context for an incoming request.
    pub fn new(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Context::from_parts(parts, body)
    }

    /// Creates the context from the parts of an incoming request.
    pub fn from_parts(request: Parts, body: Bytes) -> Self {
        Context {
            request,
            body,
            params: Params::default(),
            store: HashMap::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            response: Bytes::new(),
            chain: Vec::new(),
            cursor: 0,
        }
    }

    /// Runs the next handler in the chain and returns its result.
    ///
    /// Middleware calls this to pass control inward. Returning without
    /// calling `next` ends the chain early: the remaining handlers never run.
    /// Once the chain is exhausted, `next` returns `Ok(())`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(), Error> {
        let handler = match self.chain.get(self.cursor) {
            Some(handler) => handler.clone(),
            None => return Ok(()),
        };

        self.cursor += 1;
        handler.call(self)
    }

    // Replaces the handler chain and rewinds the cursor before its first element.
    pub(crate) fn reset_chain(&mut self, chain: Vec<Handler>) {
        self.chain = chain;
        self.cursor = 0;
    }

    /// Returns `true` once every handler of the chain has been started.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chain.len()
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    /// The path of the request URI.
    pub fn path(&self) -> &str {
        self.request.uri.path()
    }

    /// The path and query of the request URI.
    pub fn request_uri(&self) -> &str {
        self.request
            .uri
            .path_and_query()
            .map_or_else(|| self.request.uri.path(), |pq| pq.as_str())
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// The first value of a request header, if it is valid UTF-8.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.request
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// The raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// All path parameters matched by the router.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// A path parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// A path parameter by name, or `default` if it is missing or empty.
    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.params.get_or(name, default)
    }

    /// Stores a value for later handlers of the same request.
    pub fn set<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.store.insert(key.into(), Box::new(value));
    }

    /// Reads a stored value.
    ///
    /// Returns `None` if nothing is stored under `key` or if the stored value
    /// is not a `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.store.get(key).and_then(|value| value.downcast_ref())
    }

    /// Mutably borrows a stored value.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.store
            .get_mut(key)
            .and_then(|value| value.downcast_mut())
    }

    /// Returns `true` if a value of any type is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    /// Removes a stored value and returns it if it is a `T`.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        let value = self.store.remove(key)?;
        value.downcast().ok().map(|value| *value)
    }

    /// Sets the response status.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// The response status, `200 OK` unless changed.
    pub fn response_status(&self) -> StatusCode {
        self.status
    }

    /// The response headers set so far.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body written so far.
    pub fn response_body(&self) -> &Bytes {
        &self.response
    }

    /// Sets a response header, replacing previous values.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends a response header value.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    /// Writes a plain text response.
    pub fn string(&mut self, body: impl Into<String>) -> Result<(), Error> {
        self.write(TEXT_PLAIN, Bytes::from(body.into()))
    }

    /// Writes an HTML response.
    pub fn html(&mut self, body: impl Into<String>) -> Result<(), Error> {
        self.write(TEXT_HTML, Bytes::from(body.into()))
    }

    /// Writes a binary response.
    pub fn stream(&mut self, body: impl Into<Bytes>) -> Result<(), Error> {
        self.write(OCTET_STREAM, body.into())
    }

    /// Sets the response status and writes its code as the body.
    pub fn send_status(&mut self, status: StatusCode) -> Result<(), Error> {
        self.status(status).string(status.as_u16().to_string())
    }

    /// Redirects to `target`, with `307 Temporary Redirect` unless a status is given.
    pub fn redirect(&mut self, target: &str, status: Option<StatusCode>) -> Result<(), Error> {
        let location = HeaderValue::from_str(target).map_err(Error::other)?;
        self.set_header(header::LOCATION, location);
        self.send_status(status.unwrap_or(StatusCode::TEMPORARY_REDIRECT))
    }

    fn write(&mut self, content_type: &'static str, body: Bytes) -> Result<(), Error> {
        self.set_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
        self.response = body;
        Ok(())
    }

    /// Consumes the context and produces the response.
    pub fn into_response(self) -> Response<Bytes> {
        let mut response = Response::new(self.response);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("params", &self.params)
            .field("status", &self.status)
            .field("cursor", &self.cursor)
            .field("chain", &self.chain.len())
            .finish()
    }
}
