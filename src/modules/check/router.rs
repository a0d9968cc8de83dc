use axum::http::Method;
use sales_web::{App, Error, with_state};

use super::controller::{liveness, readiness};
use crate::state::AppState;

pub fn register(app: &mut App, state: &AppState) -> Result<(), Error> {
    app.handle(
        Method::GET,
        "/readiness",
        with_state(state.clone(), readiness),
        &[],
    )?;
    app.handle(
        Method::GET,
        "/liveness",
        with_state(state.clone(), liveness),
        &[],
    )?;
    Ok(())
}
