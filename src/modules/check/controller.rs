use std::time::Duration;

use axum::{extract::Request, http::StatusCode, response::Response};
use sales_web::{Context, Error, respond};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub build: String,
    pub host: String,
}

/// Reports whether the database answers. An unreachable database is a 500
/// response, not a handler error.
#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn readiness(state: AppState, ctx: Context, _req: Request) -> Result<Response, Error> {
    let check = tokio::time::timeout(Duration::from_secs(1), sales_db::status_check(&state.db));

    match check.await {
        Ok(Ok(())) => respond(StatusCode::OK, &Readiness { status: "ok" }),
        Ok(Err(err)) => {
            warn!(trace_id = %ctx.trace_id(), error = %err, "readiness check failed");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Readiness {
                    status: "db not ready",
                },
            )
        }
        Err(_) => {
            warn!(trace_id = %ctx.trace_id(), "readiness check timed out");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Readiness {
                    status: "db not ready",
                },
            )
        }
    }
}

#[instrument(skip_all, fields(trace_id = %ctx.trace_id()))]
pub async fn liveness(state: AppState, ctx: Context, _req: Request) -> Result<Response, Error> {
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "unavailable".to_string());

    respond(
        StatusCode::OK,
        &Liveness {
            status: "up",
            build: state.build,
            host,
        },
    )
}
