use chrono::{DateTime, Utc};
use sales_auth::Claims;
use sales_web::{Error, RequestError};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::modules::can_access;
use crate::modules::products::model::{NewProduct, Product, UpdateProduct};

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("not found")]
    NotFound,

    #[error("ID is not in its proper form")]
    InvalidId,

    #[error("attempted action is not allowed")]
    Forbidden,

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ProductError> for Error {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound => RequestError::not_found(err).into(),
            ProductError::InvalidId => RequestError::bad_request(err).into(),
            ProductError::Forbidden => RequestError::forbidden(err).into(),
            ProductError::Database(_) => Error::Unexpected(err.into()),
        }
    }
}

const SELECT_PRODUCT: &str = "SELECT product_id AS id, name, cost, quantity, user_id, date_created, date_updated FROM products";

pub struct ProductService;

impl ProductService {
    /// Stores a new product owned by the caller.
    #[instrument(skip(db, claims, np), fields(owner = %claims.sub))]
    pub async fn create(
        db: &PgPool,
        trace_id: &str,
        claims: &Claims,
        np: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductError> {
        let owner = parse_id(&claims.sub)?;
        let product = Product {
            id: Uuid::new_v4(),
            name: np.name,
            cost: np.cost,
            quantity: np.quantity,
            user_id: owner,
            date_created: now,
            date_updated: now,
        };

        debug!(id = %product.id, "product.create");

        sqlx::query(
            "INSERT INTO products (product_id, name, cost, quantity, user_id, date_created, date_updated)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(product.user_id)
        .bind(product.date_created)
        .bind(product.date_updated)
        .execute(db)
        .await?;

        Ok(product)
    }

    /// Only the owner or an admin may change a product.
    #[instrument(skip(db, claims, up))]
    pub async fn update(
        db: &PgPool,
        trace_id: &str,
        claims: &Claims,
        product_id: &str,
        up: UpdateProduct,
        now: DateTime<Utc>,
    ) -> Result<(), ProductError> {
        let mut product = Self::query_by_id(db, trace_id, product_id).await?;

        if !can_access(claims, product.user_id) {
            return Err(ProductError::Forbidden);
        }

        if let Some(name) = up.name {
            product.name = name;
        }
        if let Some(cost) = up.cost {
            product.cost = cost;
        }
        if let Some(quantity) = up.quantity {
            product.quantity = quantity;
        }
        product.date_updated = now;

        debug!(id = %product.id, "product.update");

        sqlx::query(
            "UPDATE products SET name = $2, cost = $3, quantity = $4, date_updated = $5
             WHERE product_id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.quantity)
        .bind(product.date_updated)
        .execute(db)
        .await?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, trace_id: &str, product_id: &str) -> Result<(), ProductError> {
        let id = parse_id(product_id)?;

        debug!(%id, "product.delete");

        sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn query(db: &PgPool, trace_id: &str) -> Result<Vec<Product>, ProductError> {
        debug!("product.query");

        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY name"))
            .fetch_all(db)
            .await?;

        Ok(products)
    }

    #[instrument(skip(db))]
    pub async fn query_by_id(
        db: &PgPool,
        trace_id: &str,
        product_id: &str,
    ) -> Result<Product, ProductError> {
        let id = parse_id(product_id)?;

        debug!(%id, "product.query_by_id");

        sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE product_id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or(ProductError::NotFound)
    }
}

fn parse_id(id: &str) -> Result<Uuid, ProductError> {
    Uuid::parse_str(id).map_err(|_| ProductError::InvalidId)
}
