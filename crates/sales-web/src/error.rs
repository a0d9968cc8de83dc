//! Error taxonomy for the request pipeline.
//!
//! Handlers and middleware return [`Error`]. Only [`Error::Request`] carries a
//! client-facing status; every other variant is an integrity failure that the
//! [`App`](crate::App) turns into a shutdown signal.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Expected failure that maps to a client response.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A value the pipeline relies on is missing from the request context.
    /// This is a wiring defect, never a client problem.
    #[error("context: {0}")]
    Context(String),

    /// Invalid app or route configuration, reported at startup.
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must take the process down rather than produce a response.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Request(_))
    }
}

/// A single invalid field in a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// Error with a status code that is safe to show to the caller.
#[derive(Debug)]
pub struct RequestError {
    pub status: StatusCode,
    pub error: anyhow::Error,
    pub fields: Vec<FieldError>,
}

impl RequestError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    /// Builds a 400 listing every field that failed validation.
    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    error: error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!("field validation error"),
            fields,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RequestError {}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.error.to_string(),
            fields: self.fields,
        });

        (self.status, body).into_response()
    }
}
