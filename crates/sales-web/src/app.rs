//! The application: route registration, dispatch and the shutdown policy.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
};
use tracing::error;

use crate::context::Context;
use crate::error::Error;
use crate::middleware::{Handler, Middleware, wrap_middleware};
use crate::shutdown::{Shutdown, ShutdownSignal};

/// How a dispatched request ended.
pub enum Outcome {
    /// The pipeline produced a response for the client.
    Responded(Response),
    /// An error escaped every middleware. The process must shut down.
    Fatal(Error),
}

impl From<Result<Response, Error>> for Outcome {
    fn from(result: Result<Response, Error>) -> Self {
        match result {
            Ok(res) => Self::Responded(res),
            Err(err) => Self::Fatal(err),
        }
    }
}

struct Route {
    method: Method,
    filter: MethodFilter,
    handler: Handler,
}

/// Entrypoint into the application. It owns the app-wide middleware, the route
/// table and the shutdown sink.
///
/// Routes are registered at startup with [`App::handle`] and the app is then
/// turned into an axum [`Router`] with [`App::into_router`].
pub struct App {
    shutdown: Shutdown,
    mw: Vec<Option<Middleware>>,
    routes: BTreeMap<String, Vec<Route>>,
}

impl App {
    pub fn new(shutdown: Shutdown, mw: Vec<Option<Middleware>>) -> Self {
        Self {
            shutdown,
            mw,
            routes: BTreeMap::new(),
        }
    }

    /// Asks the hosting process to shut down gracefully after an integrity
    /// failure. Never blocks.
    pub fn signal_shutdown(&self) -> bool {
        signal_shutdown(&self.shutdown)
    }

    /// Binds `handler` to `method` and `path`. Route middleware runs inside
    /// the app-wide middleware, closest to the handler.
    pub fn handle(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
        mw: &[Option<Middleware>],
    ) -> Result<(), Error> {
        validate_path(path)?;

        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| Error::config(format!("unsupported method {method} for {path}")))?;

        let routes = self.routes.entry(path.to_string()).or_default();
        if routes.iter().any(|route| route.method == method) {
            return Err(Error::config(format!("duplicate route {method} {path}")));
        }

        let handler = wrap_middleware(mw, handler);
        let handler = wrap_middleware(&self.mw, handler);

        routes.push(Route {
            method,
            filter,
            handler,
        });
        Ok(())
    }

    /// Number of registered (method, path) pairs.
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn into_router(self) -> Router {
        let mut router = Router::new();

        for (path, routes) in self.routes {
            let mut method_router = MethodRouter::new();
            for route in routes {
                let handler = route.handler;
                let shutdown = self.shutdown.clone();
                method_router = method_router.on(route.filter, move |req: Request| {
                    serve(handler.clone(), shutdown.clone(), req)
                });
            }
            router = router.route(&path, method_router);
        }

        router
    }
}

/// Runs one request through its composed handler with a fresh context.
pub async fn dispatch(handler: &Handler, ctx: Context, req: Request) -> Outcome {
    handler(ctx, req).await.into()
}

/// Queues [`ShutdownSignal::Terminate`]. Returns `false` without blocking when
/// a signal is already pending.
pub fn signal_shutdown(shutdown: &Shutdown) -> bool {
    shutdown.signal(ShutdownSignal::Terminate)
}

async fn serve(handler: Handler, shutdown: Shutdown, req: Request) -> Response {
    let ctx = Context::new();
    let trace_id = ctx.trace_id().to_string();

    match dispatch(&handler, ctx, req).await {
        Outcome::Responded(res) => res,
        Outcome::Fatal(err) => {
            error!(trace_id = %trace_id, error = %err, "integrity failure, signalling shutdown");
            signal_shutdown(&shutdown);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn validate_path(path: &str) -> Result<(), Error> {
    if !path.starts_with('/') {
        return Err(Error::config(format!("path {path:?} must start with '/'")));
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(Error::config(format!(
            "path {path:?} uses legacy parameter syntax, use {{name}}"
        )));
    }
    Ok(())
}
