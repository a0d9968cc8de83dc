//! Helpers for writing responses.

use anyhow::Context as _;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::Error;

/// Marshals `data` as JSON with the given status. `204 No Content` is sent
/// without a body.
pub fn respond<T>(status: StatusCode, data: &T) -> Result<Response, Error>
where
    T: Serialize + ?Sized,
{
    if status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }

    let body = serde_json::to_vec(data).context("marshalling response")?;

    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}
