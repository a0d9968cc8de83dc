//! Handlers, middleware and chain composition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{extract::Request, response::Response};

use crate::context::Context;
use crate::error::Error;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request handler within the framework. It owns the request context for the
/// duration of the call.
pub type Handler =
    Arc<dyn Fn(Context, Request) -> BoxFuture<'static, Result<Response, Error>> + Send + Sync>;

/// Code that runs before and/or after another [`Handler`]. A middleware wraps
/// a handler and returns the wrapped handler.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Builds a [`Handler`] from an async closure.
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Context, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    Arc::new(
        move |ctx: Context, req: Request| -> BoxFuture<'static, Result<Response, Error>> {
            Box::pin(f(ctx, req))
        },
    )
}

/// Builds a [`Handler`] from an async function that takes shared state first.
/// The state is cloned for every request.
pub fn with_state<S, F, Fut>(state: S, f: F) -> Handler
where
    S: Clone + Send + Sync + 'static,
    F: Fn(S, Context, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    handler(move |ctx, req| f(state.clone(), ctx, req))
}

/// Builds a [`Middleware`] from a closure that wraps a handler.
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps `handler` in `mw` so that requests run through the middleware in the
/// order given: the first entry is outermost. `None` entries are skipped.
pub fn wrap_middleware(mw: &[Option<Middleware>], handler: Handler) -> Handler {
    // Folding from the back makes the first middleware the last to wrap.
    mw.iter()
        .rev()
        .flatten()
        .fold(handler, |handler, m| m(handler))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{body::Body, http::StatusCode, response::IntoResponse};

    use super::*;

    type Trail = Arc<Mutex<Vec<String>>>;

    fn recording(name: &'static str, trail: Trail) -> Middleware {
        middleware(move |next: Handler| {
            let trail = trail.clone();
            handler(move |ctx, req| {
                let trail = trail.clone();
                let next = next.clone();
                async move {
                    trail.lock().unwrap().push(format!("{name}-before"));
                    let res = next(ctx, req).await;
                    trail.lock().unwrap().push(format!("{name}-after"));
                    res
                }
            })
        })
    }

    fn terminal(trail: Trail) -> Handler {
        handler(move |_ctx, _req| {
            let trail = trail.clone();
            async move {
                trail.lock().unwrap().push("handler".to_string());
                Ok(StatusCode::OK.into_response())
            }
        })
    }

    async fn run(h: Handler) -> Result<Response, Error> {
        h(Context::new(), Request::new(Body::empty())).await
    }

    #[tokio::test]
    async fn test_first_middleware_is_outermost() {
        let trail = Trail::default();
        let mw = [
            Some(recording("a", trail.clone())),
            Some(recording("b", trail.clone())),
        ];

        let h = wrap_middleware(&mw, terminal(trail.clone()));
        run(h).await.unwrap();

        assert_eq!(
            *trail.lock().unwrap(),
            vec!["a-before", "b-before", "handler", "b-after", "a-after"]
        );
    }

    #[tokio::test]
    async fn test_none_entries_are_skipped() {
        let trail = Trail::default();
        let mw = [
            None,
            Some(recording("a", trail.clone())),
            None,
            Some(recording("b", trail.clone())),
            None,
        ];

        let h = wrap_middleware(&mw, terminal(trail.clone()));
        let res = run(h).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            *trail.lock().unwrap(),
            vec!["a-before", "b-before", "handler", "b-after", "a-after"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_is_the_handler() {
        let trail = Trail::default();
        let h = wrap_middleware(&[None, None], terminal(trail.clone()));
        run(h).await.unwrap();

        assert_eq!(*trail.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn test_composition_has_no_side_effects() {
        let trail = Trail::default();
        let mw = [Some(recording("a", trail.clone()))];

        let _h = wrap_middleware(&mw, terminal(trail.clone()));

        assert!(trail.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_state_passes_clone_per_request() {
        async fn count(calls: Arc<Mutex<u32>>, _ctx: Context, _req: Request) -> Result<Response, Error> {
            *calls.lock().unwrap() += 1;
            Ok(StatusCode::OK.into_response())
        }

        let calls = Arc::new(Mutex::new(0));
        let h = with_state(calls.clone(), count);
        run(h.clone()).await.unwrap();
        run(h).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_handler() {
        let trail = Trail::default();
        let deny = middleware(|_next: Handler| {
            handler(|_ctx, _req| async { Ok(StatusCode::FORBIDDEN.into_response()) })
        });
        let mw = [Some(recording("a", trail.clone())), Some(deny)];

        let h = wrap_middleware(&mw, terminal(trail.clone()));
        let res = run(h).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(*trail.lock().unwrap(), vec!["a-before", "a-after"]);
    }
}
