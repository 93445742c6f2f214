use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyper::server::conn::http1::Builder as ConnectionBuilder;
use hyper_util::rt::TokioIo;
use sprig::middleware::{cors, recovery, request_id, request_logger};
use sprig::{Config, Context, Error, Router, RouterService};
use tokio::net::TcpListener;

use http::StatusCode;

// GET /
fn index(ctx: &mut Context) -> Result<(), Error> {
    ctx.string("Hello, world!")
}

// GET /blog/:slug
fn post(ctx: &mut Context) -> Result<(), Error> {
    let slug = ctx.param_or("slug", "latest").to_owned();
    ctx.html(format!("<h1>{}</h1>", slug))
}

// GET /static/*path
fn file(ctx: &mut Context) -> Result<(), Error> {
    let path = ctx.param_or("path", "index.html").to_owned();
    ctx.string(format!("serving {}", path))
}

// GET /panic
fn panics(_: &mut Context) -> Result<(), Error> {
    panic!("handler blew up")
}

// Every `/admin` request must carry the admin token.
fn auth(ctx: &mut Context) -> Result<(), Error> {
    match ctx.header("authorization") {
        Some("Bearer admin") => ctx.next(),
        _ => Err(Error::new(StatusCode::UNAUTHORIZED, "401 Unauthorized")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pretty_env_logger::init();

    let config = Config::default().error_handler(|ctx, err| {
        let message = format!("{{\"error\":\"{}\"}}", err);
        let _ = ctx.status(err.status()).string(message);
    });

    let mut router = Router::with_config(config);

    router.add_middleware(
        "/",
        [
            recovery::new(recovery::Config::default()),
            request_id::new(request_id::Config::default()),
            request_logger::new(request_logger::Config::default()),
            cors::new(cors::Config::default()),
        ],
    )?;

    router.get("/", index)?;
    router.get("/blog/:slug", post)?;
    router.get("/static/*path", file)?;
    router.get("/panic", panics)?;

    let hits = Arc::new(AtomicUsize::new(0));
    let mut admin = router.group("/admin");
    admin.middleware([auth])?;
    admin.get("/stats", move |ctx: &mut Context| {
        let hits = hits.fetch_add(1, Ordering::Relaxed) + 1;
        ctx.string(format!("stats requested {} times", hits))
    })?;

    let service = RouterService::new(router);
    let listener = TcpListener::bind(("127.0.0.1", 3000)).await?;

    loop {
        let (tcp, _) = listener.accept().await?;
        let service = service.clone();
        tokio::task::spawn(async move {
            if let Err(err) = ConnectionBuilder::new()
                .serve_connection(TokioIo::new(tcp), service)
                .await
            {
                println!("Error serving connection: {:?}", err);
            }
        });
    }
}
