use anyhow::anyhow;
use axum::{RequestExt, extract::Request, http::StatusCode, response::Response};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sales_web::{Context, Error, RequestError, decode, param, respond};
use tracing::instrument;

use crate::modules::claims;
use crate::modules::users::model::{NewUser, TokenResponse, UpdateUser};
use crate::modules::users::service::UserService;
use crate::state::AppState;

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn query(state: AppState, ctx: Context, _req: Request) -> Result<Response, Error> {
    let users = UserService::query(&state.db, ctx.trace_id()).await?;
    respond(StatusCode::OK, &users)
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn query_by_id(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let claims = claims(&ctx)?;
    let id: String = param(&mut req).await?;

    let user = UserService::query_by_id(&state.db, ctx.trace_id(), &claims, &id).await?;
    respond(StatusCode::OK, &user)
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn create(state: AppState, ctx: Context, req: Request) -> Result<Response, Error> {
    let nu: NewUser = decode(req).await?;

    let user = UserService::create(&state.db, ctx.trace_id(), nu, ctx.values.now).await?;
    respond(StatusCode::CREATED, &user)
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn update(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let claims = claims(&ctx)?;
    let id: String = param(&mut req).await?;
    let uu: UpdateUser = decode(req).await?;

    UserService::update(&state.db, ctx.trace_id(), &claims, &id, uu, ctx.values.now).await?;
    respond(StatusCode::NO_CONTENT, &())
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn delete(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let id: String = param(&mut req).await?;

    UserService::delete(&state.db, ctx.trace_id(), &id).await?;
    respond(StatusCode::NO_CONTENT, &())
}

/// Exchanges HTTP Basic credentials for a token signed with the key `{kid}`.
#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn token(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let kid: String = param(&mut req).await?;

    let TypedHeader(Authorization(basic)) = req
        .extract_parts::<TypedHeader<Authorization<Basic>>>()
        .await
        .map_err(|_| {
            RequestError::unauthorized(anyhow!("must provide email and password in Basic auth"))
        })?;

    let claims = UserService::authenticate(
        &state.db,
        ctx.trace_id(),
        ctx.values.now,
        basic.username(),
        basic.password(),
    )
    .await?;

    let token = state
        .auth
        .generate_token(&kid, &claims)
        .map_err(RequestError::bad_request)?;

    respond(StatusCode::OK, &TokenResponse { token })
}
