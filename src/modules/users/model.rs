//! User records and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A user as stored. The password hash never leaves the service.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct NewUser {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles: Vec<String>,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirm: String,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Deserialize, Validate, Debug, Clone, Default)]
#[validate(schema(function = "passwords_match"))]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles: Option<Vec<String>>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// A new password must come with an identical confirmation.
fn passwords_match(uu: &UpdateUser) -> Result<(), ValidationError> {
    if uu.password != uu.password_confirm {
        let mut err = ValidationError::new("must_match");
        err.message = Some("passwords do not match".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}
