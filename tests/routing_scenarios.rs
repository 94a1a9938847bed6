//! Engine-level routing scenarios, driven through `Router::build` and `Engine::dispatch`.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use axum::http::{header, Method, StatusCode};

use common::{body_text, get, request};
use sluice::middleware::recovery;
use sluice::{chain, Context, EngineConfig, Handler, HttpMethod, RouteError, Router};

fn echo_params(ctx: &mut Context) {
    let rendered: Vec<String> = ctx
        .params()
        .iter()
        .map(|p| format!("{}={}", p.name, p.value))
        .collect();
    ctx.text(StatusCode::OK, rendered.join("&"));
}

fn named(label: &'static str) -> Handler {
    Handler::func(move |ctx| ctx.text(StatusCode::OK, label))
}

#[tokio::test]
async fn test_static_wins_regardless_of_registration_order() {
    let orders: [[(&str, &str); 3]; 3] = [
        [("/abc", "static"), ("/<id>", "holder"), ("/*", "glob")],
        [("/*", "glob"), ("/<id>", "holder"), ("/abc", "static")],
        [("/<id>", "holder"), ("/*", "glob"), ("/abc", "static")],
    ];

    for order in orders {
        let mut router = Router::new();
        for (path, label) in order {
            router.get(path, [named(label)]);
        }
        let engine = router.build(&EngineConfig::default()).unwrap();

        assert_eq!(body_text(engine.dispatch(get("/abc"))).await, "static");
        assert_eq!(body_text(engine.dispatch(get("/xyz"))).await, "holder");
        assert_eq!(body_text(engine.dispatch(get("/x/y"))).await, "glob");
    }
}

#[tokio::test]
async fn test_static_holder_and_glob_siblings() {
    let mut router = Router::new();
    router.get("/a/1", [named("one")]);
    router.get("/a/<id:int>", [named("holder")]);
    router.get("/a/b/*", [named("glob")]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    let found = engine.find(HttpMethod::Get, "/a/1").unwrap();
    assert!(found.params.is_empty());
    assert_eq!(body_text(engine.dispatch(get("/a/1"))).await, "one");

    let found = engine.find(HttpMethod::Get, "/a/42").unwrap();
    assert_eq!(found.params.get("id"), Some("42"));
    assert_eq!(body_text(engine.dispatch(get("/a/42"))).await, "holder");

    let found = engine.find(HttpMethod::Get, "/a/b/x/y").unwrap();
    assert_eq!(found.params.get("*0"), Some("x/y"));
    assert_eq!(body_text(engine.dispatch(get("/a/b/x/y"))).await, "glob");
}

#[test]
fn test_lookup_is_deterministic() {
    let mut router = Router::new();
    router.get("/a/<id>/*rest", chain![echo_params]);
    router.get(r"/a/<n ~ \d+>/b", chain![echo_params]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    let first = engine.find(HttpMethod::Get, "/a/7/b").unwrap();
    for _ in 0..10 {
        let again = engine.find(HttpMethod::Get, "/a/7/b").unwrap();
        assert!(Arc::ptr_eq(&first.handlers, &again.handlers));
        assert_eq!(first.params, again.params);
    }
    assert_eq!(first.params.get("n"), Some("7"));
}

#[tokio::test]
async fn test_wildcard_tail_forms() {
    let mut router = Router::new();
    router.get("/file/*", chain![echo_params]);
    router.get("/named/*name", chain![echo_params]);
    router.get("/hidden/*_", chain![echo_params]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    let found = engine.find(HttpMethod::Get, "/file/a/b.png").unwrap();
    assert_eq!(found.params.get("*0"), Some("a/b.png"));
    assert_eq!(found.params.tail(), Some("a/b.png"));

    let response = engine.dispatch(get("/named/a/b.png"));
    assert_eq!(body_text(response).await, "name=a/b.png");

    let found = engine.find(HttpMethod::Get, "/hidden/a/b.png").unwrap();
    assert!(found.params.is_empty());
}

#[test]
fn test_regexp_arity_checked_at_build() {
    let mut router = Router::new();
    router.get(r"/<id ~ z(\d*)b>", chain![echo_params]);
    let engine = router.build(&EngineConfig::default()).unwrap();
    let found = engine.find(HttpMethod::Get, "/z42b").unwrap();
    assert_eq!(found.params.get("id"), Some("42"));

    let mut router = Router::new();
    router.get(r"/<id1,id2 ~ z(\d*)b>", chain![echo_params]);
    let err = router.build(&EngineConfig::default()).unwrap_err();
    assert!(matches!(
        err.errors(),
        [RouteError::Pattern { path, .. }] if path == r"/<id1,id2 ~ z(\d*)b>"
    ));
}

#[test]
fn test_duplicate_routes() {
    let mut router = Router::new();
    router.get("/a", chain![echo_params]);
    router.get("/a", chain![echo_params]);
    assert!(router.build(&EngineConfig::default()).is_err());

    let mut router = Router::new();
    router.get("/a", chain![echo_params]);
    router.post("/a", chain![echo_params]);
    assert!(router.build(&EngineConfig::default()).is_ok());
}

#[tokio::test]
async fn test_writing_middleware_short_circuits() {
    let reached = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reached);

    let mut router = Router::new();
    router.use_middleware([Handler::func(|ctx| {
        if ctx.headers().get(header::AUTHORIZATION).is_none() {
            ctx.text(StatusCode::UNAUTHORIZED, "login required");
        }
    })]);
    router.get(
        "/secret",
        [Handler::func(move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.text(StatusCode::OK, "secret");
        })],
    );
    let engine = router.build(&EngineConfig::default()).unwrap();

    let response = engine.dispatch(get("/secret"));
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "login required");
    assert_eq!(reached.load(Ordering::SeqCst), 0);

    let mut authorized = get("/secret");
    authorized
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer t".parse().unwrap());
    assert_eq!(engine.dispatch(authorized).status(), StatusCode::OK);
    assert_eq!(reached.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pool_is_clean_after_panic() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);

    let mut router = Router::new();
    router.get(
        "/boom/<id>",
        [Handler::func(|ctx| {
            ctx.extensions_mut().insert(42u32);
            ctx.write_header(StatusCode::ACCEPTED);
            panic!("unrecovered");
        })],
    );
    router.get(
        "/inspect",
        [Handler::func(move |ctx| {
            record.lock().unwrap().push((
                ctx.params().len(),
                ctx.extensions().get::<u32>().copied(),
            ));
        })],
    );
    let engine = router.build(&EngineConfig::default()).unwrap();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        engine.dispatch(get("/boom/9"));
    }));
    assert!(outcome.is_err());
    assert_eq!(engine.pool().idle(), 1);

    let response = engine.dispatch(get("/inspect"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*seen.lock().unwrap(), vec![(0, None)]);
}

#[tokio::test]
async fn test_recovery_contains_panic() {
    let mut router = Router::classic();
    router.get("/boom", [Handler::func(|_| panic!("handler failed"))]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    let response = engine.dispatch(get("/boom"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn test_group_middleware_ordering() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let step = |label: &'static str| {
        let trace = Arc::clone(&trace);
        Handler::func(move |_ctx| trace.lock().unwrap().push(label))
    };

    let mut router = Router::new();
    router.use_middleware([step("global")]);
    router.group("/api", |api| {
        api.use_middleware([step("api")]);
        api.group("/v1", |v1| {
            v1.use_middleware([step("v1")]);
            v1.get("/users/<id>", [step("route"), Handler::func(echo_params)]);
        });
    });
    let engine = router.build(&EngineConfig::default()).unwrap();

    let response = engine.dispatch(get("/api/v1/users/5"));
    assert_eq!(body_text(response).await, "id=5");
    assert_eq!(*trace.lock().unwrap(), vec!["global", "api", "v1", "route"]);
}

#[tokio::test]
async fn test_middleware_observes_downstream() {
    let mut router = Router::new();
    router.use_middleware([Handler::func(|ctx| {
        ctx.next();
        let status = ctx.status().map(|s| s.as_u16()).unwrap_or(0);
        if let Ok(value) = status.to_string().parse() {
            ctx.header_mut().insert("x-downstream-status", value);
        }
    })]);
    router.get("/", [Handler::func(|ctx| ctx.abort_with_status(StatusCode::NO_CONTENT))]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    let response = engine.dispatch(get("/"));
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["x-downstream-status"], "204");
}

#[tokio::test]
async fn test_not_found_chain_runs_root_middleware() {
    let mut router = Router::new();
    router.use_middleware([Handler::func(|ctx| {
        if let Ok(value) = "yes".parse() {
            ctx.header_mut().insert("x-root", value);
        }
    })]);
    router.get("/", chain![echo_params]);
    router.not_found([Handler::func(|ctx| ctx.text(StatusCode::NOT_FOUND, "custom"))]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    let response = engine.dispatch(get("/missing"));
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-root"], "yes");
    assert_eq!(body_text(response).await, "custom");
}

#[test]
fn test_method_handling() {
    let mut router = Router::new();
    router.any("/any", chain![echo_params]);
    router.get("/get", chain![echo_params]);
    let engine = router.build(&EngineConfig::default()).unwrap();

    assert_eq!(engine.dispatch(request(Method::PATCH, "/any")).status(), StatusCode::OK);
    assert_eq!(engine.dispatch(request(Method::HEAD, "/any")).status(), StatusCode::NOT_FOUND);
    assert_eq!(engine.dispatch(request(Method::POST, "/get")).status(), StatusCode::NOT_FOUND);

    let purge = Method::from_bytes(b"PURGE").unwrap();
    assert_eq!(
        engine.dispatch(request(purge, "/get")).status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_static_router_agrees_with_tree() {
    let declare = || {
        let mut router = Router::new();
        router.get("/a/b/c", [named("static")]);
        router.get("/a/<x>/c", [named("holder")]);
        router.get("/<x>/b/d", [named("deep")]);
        router
    };

    let plain = declare().build(&EngineConfig::default()).unwrap();
    let fast = declare()
        .build(&EngineConfig {
            static_router: true,
            ..EngineConfig::default()
        })
        .unwrap();

    for path in ["/a/b/c", "/a/z/c", "/q/b/d", "/nope"] {
        let a = plain.dispatch(get(path));
        let b = fast.dispatch(get(path));
        assert_eq!(a.status(), b.status(), "{path}");
        assert_eq!(body_text(a).await, body_text(b).await, "{path}");
    }
    assert_eq!(body_text(fast.dispatch(get("/a/b/c"))).await, "static");
}

#[test]
fn test_concurrent_dispatch_shares_engine() {
    let mut router = Router::new();
    router.get("/items/<id>", chain![echo_params]);
    let engine = Arc::new(router.build(&EngineConfig::default()).unwrap());

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..100 {
                    let found = engine.find(HttpMethod::Get, &format!("/items/{i}")).unwrap();
                    assert_eq!(found.params.get("id"), Some(i.to_string().as_str()));
                    let response = engine.dispatch(get(&format!("/items/{i}")));
                    assert_eq!(response.status(), StatusCode::OK);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    assert!(engine.pool().idle() <= 8);
}

#[test]
fn test_recovery_counts_toward_chain_length() {
    let mut router = Router::new();
    router.use_middleware([recovery()]);
    router.get("/p", [Handler::func(|_| panic!("x"))]);
    let engine = router.build(&EngineConfig::default()).unwrap();
    assert_eq!(engine.dispatch(get("/p")).status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(engine.routes()[0].handlers, 2);
}
