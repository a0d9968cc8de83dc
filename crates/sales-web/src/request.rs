//! Helpers for reading path parameters and JSON bodies.

use anyhow::anyhow;
use axum::{
    Json, RequestExt,
    extract::{FromRequest, Path, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{Error, RequestError};

/// Extracts the path parameters matched by the route, e.g. the `{id}` in
/// `/v1/users/{id}`.
pub async fn param<T>(req: &mut Request) -> Result<T, Error>
where
    T: DeserializeOwned + Send + 'static,
{
    let Path(value) = req
        .extract_parts::<Path<T>>()
        .await
        .map_err(|rejection| RequestError::bad_request(anyhow!(rejection.body_text())))?;

    Ok(value)
}

/// Reads a JSON body and validates it.
pub async fn decode<T>(req: Request) -> Result<T, Error>
where
    T: DeserializeOwned + Validate,
{
    let Json(value) = Json::<T>::from_request(req, &())
        .await
        .map_err(|rejection| RequestError::bad_request(anyhow!(rejection.body_text())))?;

    value
        .validate()
        .map_err(|errors| RequestError::validation(&errors))?;

    Ok(value)
}
