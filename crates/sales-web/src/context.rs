//! Per-request context threaded through every handler.

use axum::http::Extensions;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Values created when a request enters the app.
#[derive(Debug, Clone)]
pub struct Values {
    pub trace_id: String,
    pub now: DateTime<Utc>,
}

impl Values {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            now: Utc::now(),
        }
    }
}

impl Default for Values {
    fn default() -> Self {
        Self::new()
    }
}

/// The request-scoped record each middleware receives, may augment, and
/// forwards to the next handler.
///
/// It is owned by exactly one request flow. Middleware that adds data (for
/// example the authenticated claims) does so with [`Context::insert`] before
/// calling the inner handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub values: Values,
    extensions: Extensions,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace_id(&self) -> &str {
        &self.values.trace_id
    }

    /// Stores a typed value, replacing any previous value of the same type.
    pub fn insert<T>(&mut self, value: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value)
    }

    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.extensions.get::<T>()
    }
}
