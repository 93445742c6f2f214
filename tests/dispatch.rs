use sprig::{Config, Context, Error, Router};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Recorded = Arc<Mutex<Vec<(StatusCode, String)>>>;

// A router whose error handler records every error it receives, then writes
// the default response.
fn recording_router() -> (Router, Recorded) {
    let recorded = Recorded::default();
    let errors = recorded.clone();

    let config = Config::default().error_handler(move |ctx, err| {
        errors.lock().unwrap().push((err.status(), err.to_string()));
        sprig::default_error_handler(ctx, err);
    });

    (Router::with_config(config), recorded)
}

fn request(method: Method, uri: &str) -> Request<Bytes> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

fn get(router: &Router, uri: &str) -> Response<Bytes> {
    router.handle(request(Method::GET, uri))
}

fn unauthorized(_: &mut Context) -> Result<(), Error> {
    Err(Error::new(StatusCode::UNAUTHORIZED, "401 Unauthorized"))
}

#[test]
fn short_circuit_error_skips_handler() {
    let (mut router, recorded) = recording_router();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    router.add_middleware("/admin", [unauthorized]).unwrap();
    router
        .get("/admin/users/:id", move |ctx: &mut Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.string("user")
        })
        .unwrap();

    let response = get(&router, "/admin/users/5");

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.body(), "401 Unauthorized");
    assert_eq!(
        *recorded.lock().unwrap(),
        [(StatusCode::UNAUTHORIZED, "401 Unauthorized".to_owned())]
    );
}

#[test]
fn not_found_passes_through_middleware() {
    let (mut router, recorded) = recording_router();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let paths = seen.clone();
    router
        .add_middleware("/", [move |ctx: &mut Context| {
            paths.lock().unwrap().push(ctx.path().to_owned());
            ctx.next()
        }])
        .unwrap();
    router.get("/exists", |ctx: &mut Context| ctx.string("here")).unwrap();

    let response = get(&router, "/missing?q=1");

    assert_eq!(*seen.lock().unwrap(), ["/missing"]);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "404 Not Found: GET /missing?q=1");
    assert_eq!(
        *recorded.lock().unwrap(),
        [(
            StatusCode::NOT_FOUND,
            "404 Not Found: GET /missing?q=1".to_owned()
        )]
    );
}

#[test]
fn method_mismatch_is_not_found() {
    let (mut router, recorded) = recording_router();
    router.get("/items", |ctx: &mut Context| ctx.string("items")).unwrap();

    let response = router.handle(request(Method::POST, "/items"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "404 Not Found: POST /items");
    assert_eq!(recorded.lock().unwrap().len(), 1);
}

#[test]
fn middleware_can_handle_not_found() {
    let (mut router, recorded) = recording_router();
    router
        .add_middleware("/app", [|ctx: &mut Context| match ctx.next() {
            Err(err) if err.is_not_found() => ctx.html("<h1>nothing here</h1>"),
            result => result,
        }])
        .unwrap();

    let response = get(&router, "/app/unknown");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "<h1>nothing here</h1>");
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert!(recorded.lock().unwrap().is_empty());
}

#[test]
fn silent_early_return() {
    let (mut router, recorded) = recording_router();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    router
        .add_middleware("/", [|ctx: &mut Context| -> Result<(), Error> {
            ctx.status(StatusCode::NO_CONTENT);
            Ok(())
        }])
        .unwrap();
    router
        .get("/", move |ctx: &mut Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.string("unreachable")
        })
        .unwrap();

    let response = get(&router, "/");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(recorded.lock().unwrap().is_empty());
}

#[test]
fn middleware_wraps_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();

    let outer = log.clone();
    let inner = log.clone();
    let handler = log.clone();

    router
        .add_middleware("/", [move |ctx: &mut Context| {
            outer.lock().unwrap().push("outer before");
            let result = ctx.next();
            outer.lock().unwrap().push("outer after");
            result
        }])
        .unwrap();
    router
        .add_middleware("/api", [move |ctx: &mut Context| {
            inner.lock().unwrap().push("inner before");
            let result = ctx.next();
            inner.lock().unwrap().push("inner after");
            result
        }])
        .unwrap();
    router
        .get("/api/ping", move |ctx: &mut Context| {
            handler.lock().unwrap().push("handler");
            ctx.string("pong")
        })
        .unwrap();

    let response = get(&router, "/api/ping");

    assert_eq!(response.body(), "pong");
    assert_eq!(
        *log.lock().unwrap(),
        [
            "outer before",
            "inner before",
            "handler",
            "inner after",
            "outer after"
        ]
    );
}

#[test]
fn handler_errors_reach_error_handler_once() {
    let (mut router, recorded) = recording_router();

    // two layers both see the error on its way out
    for prefix in ["/", "/jobs"] {
        router
            .add_middleware(prefix, [|ctx: &mut Context| ctx.next()])
            .unwrap();
    }
    router
        .post("/jobs/:id", |ctx: &mut Context| -> Result<(), Error> {
            let id = ctx.param_or("id", "").to_owned();
            Err(Error::new(
                StatusCode::CONFLICT,
                format!("job {id} already running"),
            ))
        })
        .unwrap();

    let response = router.handle(request(Method::POST, "/jobs/7"));

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.body(), "job 7 already running");
    assert_eq!(
        *recorded.lock().unwrap(),
        [(StatusCode::CONFLICT, "job 7 already running".to_owned())]
    );
}

#[test]
fn opaque_errors_are_internal() {
    let mut router = Router::new();
    router
        .get("/disk", |_: &mut Context| -> Result<(), Error> {
            Err(Error::other(std::io::Error::other("disk on fire")))
        })
        .unwrap();

    let response = get(&router, "/disk");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body(), "disk on fire");
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
}

#[test]
fn default_error_handler_answers_not_found() {
    let router = Router::new();

    let response = get(&router, "/nowhere");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "404 Not Found: GET /nowhere");
}

#[test]
fn store_is_shared_along_the_chain() {
    let mut router = Router::new();
    router
        .add_middleware("/", [|ctx: &mut Context| {
            let user = ctx.header("x-user").unwrap_or("anonymous").to_owned();
            ctx.set("user", user);
            ctx.next()
        }])
        .unwrap();
    router
        .get("/whoami", |ctx: &mut Context| {
            let user = ctx.get::<String>("user").cloned().unwrap_or_default();
            ctx.string(user)
        })
        .unwrap();

    let request = Request::get("/whoami")
        .header("x-user", "ferris")
        .body(Bytes::new())
        .unwrap();
    assert_eq!(router.handle(request).body(), "ferris");
    assert_eq!(get(&router, "/whoami").body(), "anonymous");
}

#[test]
fn dispatch_on_caller_context() {
    let mut router = Router::new();
    router
        .get("/files/*path", |ctx: &mut Context| {
            let path = ctx.param_or("path", "index.html").to_owned();
            ctx.set("served", path);
            ctx.stream(Bytes::from_static(b"\x00\x01"))
        })
        .unwrap();

    let mut ctx = Context::new(request(Method::GET, "/files/img/logo.png"));
    router.dispatch(&mut ctx);

    assert_eq!(ctx.param("path"), Some("img/logo.png"));
    assert_eq!(ctx.get::<String>("served").map(String::as_str), Some("img/logo.png"));
    assert_eq!(ctx.response_body().as_ref(), b"\x00\x01");
    assert!(ctx.is_exhausted());
}

#[test]
fn redirects() {
    let mut router = Router::new();
    router
        .get("/old", |ctx: &mut Context| ctx.redirect("/new", None))
        .unwrap();
    router
        .get("/gone", |ctx: &mut Context| {
            ctx.redirect("/new", Some(StatusCode::MOVED_PERMANENTLY))
        })
        .unwrap();

    let response = get(&router, "/old");
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()["location"], "/new");

    let response = get(&router, "/gone");
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.body(), "301");
}

#[test]
fn shared_between_threads() {
    let mut router = Router::new();
    router
        .get("/n/:n", |ctx: &mut Context| {
            let n = ctx.param_or("n", "0").to_owned();
            ctx.string(n)
        })
        .unwrap();

    let router = Arc::new(router);

    std::thread::scope(|scope| {
        for i in 0..8 {
            let router = router.clone();
            scope.spawn(move || {
                for _ in 0..100 {
                    let response = get(&router, &format!("/n/{i}"));
                    assert_eq!(response.body(), &*i.to_string());
                }
            });
        }
    });
}

#[test]
fn params_are_percent_decoded() {
    let (mut router, recorded) = recording_router();
    router
        .get("/user/:name", |ctx: &mut Context| {
            let name = ctx.param_or("name", "").to_owned();
            ctx.string(name)
        })
        .unwrap();
    router
        .get("/files/*path", |ctx: &mut Context| {
            let path = ctx.param_or("path", "").to_owned();
            ctx.string(path)
        })
        .unwrap();
    router.get("/café", |ctx: &mut Context| ctx.string("coffee")).unwrap();

    assert_eq!(get(&router, "/user/hello%20world").body(), "hello world");
    // an encoded slash stays inside its segment
    assert_eq!(get(&router, "/user/a%2Fb").body(), "a/b");
    assert_eq!(get(&router, "/files/my%20docs/a%2Bb.txt").body(), "my docs/a+b.txt");
    assert_eq!(get(&router, "/caf%C3%A9").body(), "coffee");

    // the not-found message keeps the request uri as received
    let response = get(&router, "/missing%20page/x%2Fy");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body(), "404 Not Found: GET /missing%20page/x%2Fy");
    assert_eq!(recorded.lock().unwrap().len(), 1);
}
