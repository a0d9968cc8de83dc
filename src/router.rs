use std::time::Duration;

use axum::Router;
use sales_web::{App, Error, Shutdown};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};

use crate::mid::{errors, logger, panics};
use crate::modules::{check, products, users};
use crate::state::AppState;

/// Builds the app with every route registered. App-wide middleware runs in
/// the order logger, errors, panics.
pub fn api(shutdown: Shutdown, state: AppState) -> Result<App, Error> {
    let mut app = App::new(
        shutdown,
        vec![Some(logger()), Some(errors()), Some(panics())],
    );

    check::router::register(&mut app, &state)?;
    users::router::register(&mut app, &state)?;
    products::router::register(&mut app, &state)?;

    Ok(app)
}

/// Converts the app into a servable router with request deadlines.
#[allow(deprecated)]
pub fn init_router(app: App, read_timeout: Duration, write_timeout: Duration) -> Router {
    app.into_router()
        .layer(TimeoutLayer::new(write_timeout))
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
}
