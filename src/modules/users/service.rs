use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use sales_auth::Claims;
use sales_web::{Error, RequestError};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::modules::can_access;
use crate::modules::users::model::{NewUser, UpdateUser, User};

/// Lifetime in hours of tokens issued by [`UserService::authenticate`].
pub const TOKEN_LIFETIME_HOURS: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("not found")]
    NotFound,

    #[error("ID is not in its proper form")]
    InvalidId,

    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("attempted action is not allowed")]
    Forbidden,

    #[error("email is already in use")]
    DuplicateEmail,

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("hashing password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<UserError> for Error {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => RequestError::not_found(err).into(),
            UserError::InvalidId => RequestError::bad_request(err).into(),
            UserError::AuthenticationFailure => RequestError::unauthorized(err).into(),
            UserError::Forbidden => RequestError::forbidden(err).into(),
            UserError::DuplicateEmail => RequestError::new(StatusCode::CONFLICT, err).into(),
            UserError::Database(_) | UserError::Hash(_) => Error::Unexpected(err.into()),
        }
    }
}

const SELECT_USER: &str = "SELECT user_id AS id, name, email, roles, password_hash, date_created, date_updated FROM users";

pub struct UserService;

impl UserService {
    #[instrument(skip(db, nu), fields(email = %nu.email))]
    pub async fn create(
        db: &PgPool,
        trace_id: &str,
        nu: NewUser,
        now: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let user = User {
            id: Uuid::new_v4(),
            name: nu.name,
            email: nu.email,
            roles: nu.roles,
            password_hash: bcrypt::hash(&nu.password, bcrypt::DEFAULT_COST)?,
            date_created: now,
            date_updated: now,
        };

        debug!(id = %user.id, "user.create");

        sqlx::query(
            "INSERT INTO users (user_id, name, email, roles, password_hash, date_created, date_updated)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.roles)
        .bind(&user.password_hash)
        .bind(user.date_created)
        .bind(user.date_updated)
        .execute(db)
        .await
        .map_err(write_error)?;

        Ok(user)
    }

    /// Applies the present fields of `uu`. Callers may only update themselves
    /// unless they are admins.
    #[instrument(skip(db, claims, uu))]
    pub async fn update(
        db: &PgPool,
        trace_id: &str,
        claims: &Claims,
        user_id: &str,
        uu: UpdateUser,
        now: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut user = Self::query_by_id(db, trace_id, claims, user_id).await?;

        if let Some(name) = uu.name {
            user.name = name;
        }
        if let Some(email) = uu.email {
            user.email = email;
        }
        if let Some(roles) = uu.roles {
            user.roles = roles;
        }
        if let Some(password) = uu.password {
            user.password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
        }
        user.date_updated = now;

        debug!(id = %user.id, "user.update");

        sqlx::query(
            "UPDATE users SET name = $2, email = $3, roles = $4, password_hash = $5, date_updated = $6
             WHERE user_id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.roles)
        .bind(&user.password_hash)
        .bind(user.date_updated)
        .execute(db)
        .await
        .map_err(write_error)?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, trace_id: &str, user_id: &str) -> Result<(), UserError> {
        let id = parse_id(user_id)?;

        debug!(%id, "user.delete");

        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn query(db: &PgPool, trace_id: &str) -> Result<Vec<User>, UserError> {
        debug!("user.query");

        let users = sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY user_id"))
            .fetch_all(db)
            .await?;

        Ok(users)
    }

    /// Non-admins may only read their own record.
    #[instrument(skip(db, claims))]
    pub async fn query_by_id(
        db: &PgPool,
        trace_id: &str,
        claims: &Claims,
        user_id: &str,
    ) -> Result<User, UserError> {
        let id = parse_id(user_id)?;

        if !can_access(claims, id) {
            return Err(UserError::Forbidden);
        }

        debug!(%id, "user.query_by_id");

        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE user_id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or(UserError::NotFound)
    }

    /// Non-admins may only read their own record.
    #[instrument(skip(db, claims))]
    pub async fn query_by_email(
        db: &PgPool,
        trace_id: &str,
        claims: &Claims,
        email: &str,
    ) -> Result<User, UserError> {
        debug!("user.query_by_email");

        let user = find_by_email(db, email)
            .await?
            .ok_or(UserError::NotFound)?;

        if !can_access(claims, user.id) {
            return Err(UserError::Forbidden);
        }

        Ok(user)
    }

    /// Checks the credentials and returns the claims to put in a token. Any
    /// mismatch is reported as [`UserError::AuthenticationFailure`] so callers
    /// cannot probe for existing accounts.
    #[instrument(skip(db, password))]
    pub async fn authenticate(
        db: &PgPool,
        trace_id: &str,
        now: DateTime<Utc>,
        email: &str,
        password: &str,
    ) -> Result<Claims, UserError> {
        debug!("user.authenticate");

        let user = find_by_email(db, email)
            .await?
            .ok_or(UserError::AuthenticationFailure)?;

        if !bcrypt::verify(password, &user.password_hash).unwrap_or(false) {
            return Err(UserError::AuthenticationFailure);
        }

        Ok(Claims::new(
            user.id.to_string(),
            user.roles,
            now,
            Duration::hours(TOKEN_LIFETIME_HOURS),
        ))
    }
}

async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = $1"))
        .bind(email)
        .fetch_optional(db)
        .await
}

fn write_error(err: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return UserError::DuplicateEmail;
        }
    }
    UserError::Database(err)
}

fn parse_id(id: &str) -> Result<Uuid, UserError> {
    Uuid::parse_str(id).map_err(|_| UserError::InvalidId)
}
