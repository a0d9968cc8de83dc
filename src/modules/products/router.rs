use std::sync::Arc;

use axum::http::Method;
use sales_auth::ROLE_ADMIN;
use sales_web::{App, Error, with_state};

use super::controller::{create, delete, query, query_by_id, update};
use crate::mid::{authenticate, authorize};
use crate::state::AppState;

pub fn register(app: &mut App, state: &AppState) -> Result<(), Error> {
    let authn = [Some(authenticate(Arc::clone(&state.auth)))];
    let admin_only = [authn[0].clone(), Some(authorize(&[ROLE_ADMIN]))];

    app.handle(
        Method::GET,
        "/v1/products",
        with_state(state.clone(), query),
        &authn,
    )?;
    app.handle(
        Method::GET,
        "/v1/products/{id}",
        with_state(state.clone(), query_by_id),
        &authn,
    )?;
    app.handle(
        Method::POST,
        "/v1/products",
        with_state(state.clone(), create),
        &authn,
    )?;
    app.handle(
        Method::PUT,
        "/v1/products/{id}",
        with_state(state.clone(), update),
        &authn,
    )?;
    app.handle(
        Method::DELETE,
        "/v1/products/{id}",
        with_state(state.clone(), delete),
        &admin_only,
    )?;

    Ok(())
}
