//! # Sales Web
//!
//! A small web framework layered over axum's router.
//!
//! - [`App`] binds `(method, path)` pairs to a [`Handler`] plus route
//!   middleware, and wraps everything in the app-wide middleware.
//! - [`Middleware`] wraps a handler. [`wrap_middleware`] composes a list so the
//!   first entry runs first on the way in and last on the way out.
//! - [`Context`] is created per request and passed explicitly through every
//!   layer.
//! - Any [`Error`] that reaches the app is fatal: it is reported as
//!   [`Outcome::Fatal`] and the app signals [`Shutdown`]. Expected failures are
//!   [`RequestError`]s and must be turned into responses by middleware first.
//!
//! # Example
//!
//! ```ignore
//! use axum::http::{Method, StatusCode};
//! use sales_web::{App, Shutdown, handler, respond};
//!
//! let (shutdown, mut shutdown_rx) = Shutdown::channel();
//! let mut app = App::new(shutdown, vec![Some(mid::logger())]);
//!
//! app.handle(
//!     Method::GET,
//!     "/liveness",
//!     handler(|_ctx, _req| async { respond(StatusCode::OK, &"up") }),
//!     &[],
//! )?;
//!
//! axum::serve(listener, app.into_router()).await?;
//! ```

pub mod app;
pub mod context;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod shutdown;

pub use app::{App, Outcome, dispatch, signal_shutdown};
pub use context::{Context, Values};
pub use error::{Error, FieldError, RequestError};
pub use middleware::{
    BoxFuture, Handler, Middleware, handler, middleware, with_state, wrap_middleware,
};
pub use request::{decode, param};
pub use response::respond;
pub use shutdown::{Shutdown, ShutdownSignal};
