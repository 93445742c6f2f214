//! Cross-origin resource sharing.
use super::{skipped, Skipper};
use crate::{Context, Error, Handler};

use http::header::{self, HeaderName, HeaderValue};
use http::{Method, StatusCode};

/// CORS configuration.
#[derive(Clone)]
pub struct Config {
    /// Skips the middleware when it returns `true`.
    ///
    /// Optional. Default: `None`
    pub skip: Option<Skipper>,

    /// Origins allowed to access the resource. `*` allows any origin.
    ///
    /// Optional. Default: `["*"]`
    pub allow_origins: Vec<String>,

    /// Methods allowed in a preflight answer.
    ///
    /// Optional. Default: `GET, POST, HEAD, PUT, DELETE, PATCH`
    pub allow_methods: Vec<Method>,

    /// Headers allowed in a preflight answer. When empty, the headers the
    /// client asked for in `access-control-request-headers` are echoed.
    ///
    /// Optional. Default: empty
    pub allow_headers: Vec<String>,

    /// Whether the response may be shared when the request carries credentials.
    ///
    /// Optional. Default: `false`
    pub allow_credentials: bool,

    /// Response headers exposed to the client.
    ///
    /// Optional. Default: empty
    pub expose_headers: Vec<String>,

    /// How long, in seconds, a preflight answer may be cached. `0` omits the header.
    ///
    /// Optional. Default: `0`
    pub max_age: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            skip: None,
            allow_origins: vec!["*".to_owned()],
            allow_methods: vec![
                Method::GET,
                Method::POST,
                Method::HEAD,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ],
            allow_headers: Vec::new(),
            allow_credentials: false,
            expose_headers: Vec::new(),
            max_age: 0,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("skip", &self.skip.is_some())
            .field("allow_origins", &self.allow_origins)
            .field("allow_methods", &self.allow_methods)
            .field("allow_headers", &self.allow_headers)
            .field("allow_credentials", &self.allow_credentials)
            .field("expose_headers", &self.expose_headers)
            .field("max_age", &self.max_age)
            .finish()
    }
}

/// Creates the CORS middleware.
///
/// Simple requests get the allow-origin headers and continue down the chain.
/// A preflight `OPTIONS` request is answered with `204 No Content` right away;
/// the rest of the chain never runs for it.
pub fn new(config: Config) -> Handler {
    let allow_methods = join(config.allow_methods.iter().map(Method::as_str));
    let allow_headers = join(config.allow_headers.iter().map(String::as_str));
    let expose_headers = join(config.expose_headers.iter().map(String::as_str));

    Handler::new(move |ctx| {
        if skipped(&config.skip, ctx) {
            return ctx.next();
        }

        let origin = ctx.header(header::ORIGIN).unwrap_or("");
        let allow_origin = allowed_origin(&config, origin);

        ctx.append_header(header::VARY, HeaderValue::from_static("Origin"));
        if let Some(origin) = allow_origin {
            set(ctx, header::ACCESS_CONTROL_ALLOW_ORIGIN, &origin)?;
        }
        if config.allow_credentials {
            ctx.set_header(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        if ctx.method() != Method::OPTIONS {
            if !expose_headers.is_empty() {
                set(ctx, header::ACCESS_CONTROL_EXPOSE_HEADERS, &expose_headers)?;
            }
            return ctx.next();
        }

        ctx.append_header(
            header::VARY,
            HeaderValue::from_static("Access-Control-Request-Method"),
        );
        ctx.append_header(
            header::VARY,
            HeaderValue::from_static("Access-Control-Request-Headers"),
        );
        set(ctx, header::ACCESS_CONTROL_ALLOW_METHODS, &allow_methods)?;

        if !allow_headers.is_empty() {
            set(ctx, header::ACCESS_CONTROL_ALLOW_HEADERS, &allow_headers)?;
        } else if let Some(requested) = ctx
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
        {
            ctx.set_header(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
        }

        if config.max_age > 0 {
            ctx.set_header(header::ACCESS_CONTROL_MAX_AGE, config.max_age.into());
        }

        ctx.status(StatusCode::NO_CONTENT);
        Ok(())
    })
}

// With credentials, a wildcard echoes the request origin, which browsers
// require in place of a literal `*`.
fn allowed_origin(config: &Config, origin: &str) -> Option<String> {
    config.allow_origins.iter().find_map(|allowed| {
        if allowed == "*" && config.allow_credentials {
            (!origin.is_empty()).then(|| origin.to_owned())
        } else if allowed == "*" || allowed == origin {
            Some(allowed.clone())
        } else {
            None
        }
    })
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn set(ctx: &mut Context, name: HeaderName, value: &str) -> Result<(), Error> {
    let value = HeaderValue::from_str(value).map_err(Error::other)?;
    ctx.set_header(name, value);
    Ok(())
}
