mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    http::{Method, StatusCode},
    response::IntoResponse,
};
use common::{authenticator, json, request, send, token};
use sales_api::mid::{authenticate, authorize, errors, logger, panics};
use sales_auth::{Claims, ROLE_ADMIN, ROLE_USER};
use sales_web::{App, Handler, Shutdown, ShutdownSignal, handler};
use tokio::sync::mpsc::Receiver;

struct Harness {
    router: Router,
    shutdown_rx: Receiver<ShutdownSignal>,
    calls: Arc<AtomicUsize>,
    auth: Arc<sales_auth::Authenticator>,
}

fn counting_handler(calls: Arc<AtomicUsize>) -> Handler {
    handler(move |ctx, _req| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let sub = ctx.get::<Claims>().map(|c| c.sub.clone()).unwrap_or_default();
            Ok((StatusCode::OK, sub).into_response())
        }
    })
}

fn harness() -> Harness {
    let auth = authenticator();
    let calls = Arc::new(AtomicUsize::new(0));
    let (shutdown, shutdown_rx) = Shutdown::channel();

    let mut app = App::new(
        shutdown,
        vec![Some(logger()), Some(errors()), Some(panics())],
    );

    app.handle(
        Method::GET,
        "/admin",
        counting_handler(calls.clone()),
        &[
            Some(authenticate(auth.clone())),
            Some(authorize(&[ROLE_ADMIN])),
        ],
    )
    .unwrap();

    // Registered without authenticate: the claims are never there.
    app.handle(
        Method::GET,
        "/misconfigured",
        counting_handler(calls.clone()),
        &[Some(authorize(&[ROLE_ADMIN]))],
    )
    .unwrap();

    app.handle(
        Method::GET,
        "/panic",
        handler(|_ctx, _req| async {
            if true {
                panic!("handler bug");
            }
            Ok(StatusCode::OK.into_response())
        }),
        &[],
    )
    .unwrap();

    Harness {
        router: app.into_router(),
        shutdown_rx,
        calls,
        auth,
    }
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let mut h = harness();

    let (status, body) = send(&h.router, request(Method::GET, "/admin", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        json(&body)["error"],
        "expected authorization header format: bearer <token>"
    );
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    assert!(h.shutdown_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let mut h = harness();

    let (status, _) = send(
        &h.router,
        request(Method::GET, "/admin", Some("not.a.token"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    assert!(h.shutdown_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_user_on_admin_route_is_forbidden() {
    let mut h = harness();
    let token = token(&h.auth, "user-1", &[ROLE_USER]);

    let (status, body) = send(
        &h.router,
        request(Method::GET, "/admin", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "you are not authorized for that action");
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    assert!(h.shutdown_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_admin_reaches_handler_once() {
    let mut h = harness();
    let token = token(&h.auth, "admin-1", &[ROLE_ADMIN]);

    let (status, body) = send(
        &h.router,
        request(Method::GET, "/admin", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"admin-1");
    assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    assert!(h.shutdown_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_claims_signals_shutdown_once() {
    let mut h = harness();

    let (status, body) = send(&h.router, request(Method::GET, "/misconfigured", None, None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.shutdown_rx.try_recv().unwrap(), ShutdownSignal::Terminate);
    assert!(h.shutdown_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_panic_signals_shutdown() {
    let mut h = harness();

    let (status, body) = send(&h.router, request(Method::GET, "/panic", None, None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
    assert_eq!(h.shutdown_rx.try_recv().unwrap(), ShutdownSignal::Terminate);
}
