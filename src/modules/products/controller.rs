use axum::{extract::Request, http::StatusCode, response::Response};
use sales_web::{Context, Error, decode, param, respond};
use tracing::instrument;

use crate::modules::claims;
use crate::modules::products::model::{NewProduct, UpdateProduct};
use crate::modules::products::service::ProductService;
use crate::state::AppState;

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn query(state: AppState, ctx: Context, _req: Request) -> Result<Response, Error> {
    let products = ProductService::query(&state.db, ctx.trace_id()).await?;
    respond(StatusCode::OK, &products)
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn query_by_id(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let id: String = param(&mut req).await?;

    let product = ProductService::query_by_id(&state.db, ctx.trace_id(), &id).await?;
    respond(StatusCode::OK, &product)
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn create(state: AppState, ctx: Context, req: Request) -> Result<Response, Error> {
    let claims = claims(&ctx)?;
    let np: NewProduct = decode(req).await?;

    let product =
        ProductService::create(&state.db, ctx.trace_id(), &claims, np, ctx.values.now).await?;
    respond(StatusCode::CREATED, &product)
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn update(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let claims = claims(&ctx)?;
    let id: String = param(&mut req).await?;
    let up: UpdateProduct = decode(req).await?;

    ProductService::update(&state.db, ctx.trace_id(), &claims, &id, up, ctx.values.now).await?;
    respond(StatusCode::NO_CONTENT, &())
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn delete(state: AppState, ctx: Context, mut req: Request) -> Result<Response, Error> {
    let id: String = param(&mut req).await?;

    ProductService::delete(&state.db, ctx.trace_id(), &id).await?;
    respond(StatusCode::NO_CONTENT, &())
}
