use std::sync::Arc;

use axum::http::Method;
use sales_auth::ROLE_ADMIN;
use sales_web::{App, Error, with_state};

use super::controller::{create, delete, query, query_by_id, token, update};
use crate::mid::{authenticate, authorize};
use crate::state::AppState;

pub fn register(app: &mut App, state: &AppState) -> Result<(), Error> {
    let authn = Some(authenticate(Arc::clone(&state.auth)));
    let admin = Some(authorize(&[ROLE_ADMIN]));
    let admin_only = [authn.clone(), admin];

    app.handle(
        Method::GET,
        "/v1/users",
        with_state(state.clone(), query),
        &admin_only,
    )?;
    app.handle(
        Method::GET,
        "/v1/users/{id}",
        with_state(state.clone(), query_by_id),
        &[authn.clone()],
    )?;
    app.handle(
        Method::GET,
        "/v1/users/token/{kid}",
        with_state(state.clone(), token),
        &[],
    )?;
    app.handle(
        Method::POST,
        "/v1/users",
        with_state(state.clone(), create),
        &admin_only,
    )?;
    app.handle(
        Method::PUT,
        "/v1/users/{id}",
        with_state(state.clone(), update),
        &admin_only,
    )?;
    app.handle(
        Method::DELETE,
        "/v1/users/{id}",
        with_state(state.clone(), delete),
        &admin_only,
    )?;

    Ok(())
}
