use crate::{Context, Error};

use std::fmt;
use std::sync::Arc;

/// A request handler.
///
/// Handlers are the unit of composition for both middleware and the
/// terminal handler of a route. A handler receives the request context and
/// either completes the request, fails it, or passes control on with
/// [`Context::next`].
///
/// Any `Fn(&mut Context) -> Result<(), Error>` converts into a `Handler`.
///
/// ```rust
/// use sprig::{Context, Error, Handler};
///
/// fn hello(ctx: &mut Context) -> Result<(), Error> {
///     ctx.string("Hello, World!")
/// }
///
/// let logged = Handler::new(|ctx: &mut Context| {
///     println!("-> {}", ctx.path());
///     ctx.next()
/// });
///
/// let hello = Handler::from(hello);
/// assert!(!Handler::ptr_eq(&hello, &logged));
/// ```
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&mut Context) -> Result<(), Error> + Send + Sync>);

impl Handler {
    /// Wraps a function as a handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
    {
        Handler(Arc::new(f))
    }

    /// Invokes the handler.
    #[inline]
    pub fn call(&self, ctx: &mut Context) -> Result<(), Error> {
        (self.0)(ctx)
    }

    /// Returns `true` if both handlers refer to the same function instance.
    pub fn ptr_eq(this: &Handler, other: &Handler) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&mut Context) -> Result<(), Error> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Handler::new(f)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
