use std::sync::Arc;

use sales_auth::Authenticator;
use sqlx::PgPool;

/// Shared, read-only dependencies handed to every controller.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<Authenticator>,
    pub build: String,
}

impl AppState {
    pub fn new(db: PgPool, auth: Arc<Authenticator>, build: impl Into<String>) -> Self {
        Self {
            db,
            auth,
            build: build.into(),
        }
    }
}
