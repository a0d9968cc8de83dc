//! # Sales DB
//!
//! PostgreSQL access shared by the API and the admin tooling: pool
//! construction, a readiness probe, schema migrations and seed data.
//!
//! ```ignore
//! let pool = sales_db::open(&cfg.db);
//! sales_db::migrate(&pool).await?;
//! sales_db::seed(&pool).await?;
//! ```

use std::time::Duration;

use chrono::Utc;
use sales_config::DbConfig;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

pub use sqlx::PgPool;

pub const ADMIN_ID: Uuid = Uuid::from_u128(0x8389cbb5_c3c9_47dd_aaa5_69f8b9492a25);
pub const USER_ID: Uuid = Uuid::from_u128(0x146269c1_c206_4757_9bd1_c5917fcf41fe);

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "gophers";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migrating schema: {0}")]
    Migrate(#[from] MigrateError),

    #[error("hashing seed password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("database not ready after {0} attempts")]
    NotReady(u32),
}

/// Builds the pool without connecting. Connections are opened on first use.
pub fn open(cfg: &DbConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(connect_options(cfg))
}

fn connect_options(cfg: &DbConfig) -> PgConnectOptions {
    let (host, port) = match cfg.host.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().unwrap_or(5432)),
        None => (cfg.host.as_str(), 5432),
    };

    let ssl_mode = if cfg.disable_tls {
        PgSslMode::Disable
    } else {
        PgSslMode::Require
    };

    PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.name)
        .ssl_mode(ssl_mode)
        .options([("timezone", "utc")])
}

/// Returns an error if the database cannot answer a trivial query.
pub async fn status_check(pool: &PgPool) -> Result<(), Error> {
    sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Retries [`status_check`] with a growing delay.
pub async fn wait_ready(pool: &PgPool, max_attempts: u32) -> Result<(), Error> {
    for attempt in 1..=max_attempts {
        match status_check(pool).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                warn!(attempt, error = %err, "database not ready");
                tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
            }
        }
    }
    Err(Error::NotReady(max_attempts))
}

pub async fn migrate(pool: &PgPool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("migrations complete");
    Ok(())
}

/// Inserts the demo accounts and products. Existing rows are left untouched.
pub async fn seed(pool: &PgPool) -> Result<(), Error> {
    let hash = bcrypt::hash(SEED_PASSWORD, bcrypt::DEFAULT_COST)?;
    let mut tx = pool.begin().await?;

    insert_user(&mut tx, ADMIN_ID, "Admin Gopher", "admin@example.com", &["ADMIN", "USER"], &hash)
        .await?;
    insert_user(&mut tx, USER_ID, "User Gopher", "user@example.com", &["USER"], &hash).await?;

    let products = [
        (
            Uuid::from_u128(0xa2b0639f_2cc6_44b8_b97b_15d69dbb511e),
            "Comic Books",
            50,
            42,
            ADMIN_ID,
        ),
        (
            Uuid::from_u128(0x72f8b983_3eb4_48db_9ed0_e45cc6bd716b),
            "McDonalds Toys",
            75,
            120,
            USER_ID,
        ),
    ];
    for (id, name, cost, quantity, owner) in products {
        insert_product(&mut tx, id, name, cost, quantity, owner).await?;
    }

    tx.commit().await?;
    info!("seed data loaded");
    Ok(())
}

async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    name: &str,
    email: &str,
    roles: &[&str],
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO users (user_id, name, email, roles, password_hash, date_created, date_updated)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(roles)
    .bind(password_hash)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    name: &str,
    cost: i32,
    quantity: i32,
    owner: Uuid,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO products (product_id, name, cost, quantity, user_id, date_created, date_updated)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(name)
    .bind(cost)
    .bind(quantity)
    .bind(owner)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_config(host: &str) -> DbConfig {
        DbConfig {
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            host: host.to_string(),
            name: "sales".to_string(),
            disable_tls: true,
            max_connections: 4,
        }
    }

    #[test]
    fn test_connect_options_default_port() {
        let opts = connect_options(&db_config("localhost"));
        assert_eq!(opts.get_host(), "localhost");
        assert_eq!(opts.get_port(), 5432);
        assert_eq!(opts.get_database(), Some("sales"));
    }

    #[test]
    fn test_connect_options_explicit_port() {
        let opts = connect_options(&db_config("db.internal:5433"));
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 5433);
    }

    #[tokio::test]
    async fn test_open_is_lazy() {
        // Nothing listens here; building the pool must still succeed.
        let pool = open(&db_config("127.0.0.1:1"));
        assert_eq!(pool.size(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL"]
    async fn test_seed_is_idempotent(pool: PgPool) {
        seed(&pool).await.unwrap();
        seed(&pool).await.unwrap();

        let users: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 2);
        status_check(&pool).await.unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL"]
    async fn test_sales_cascade_with_product(pool: PgPool) {
        seed(&pool).await.unwrap();
        let product_id = Uuid::from_u128(0xa2b0639f_2cc6_44b8_b97b_15d69dbb511e);

        sqlx::query(
            "INSERT INTO sales (sale_id, product_id, quantity, paid, date_created)
             VALUES ($1, $2, 2, 100, $3)",
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id)
            .execute(&pool)
            .await
            .unwrap();

        let sales: i64 = sqlx::query_scalar("SELECT count(*) FROM sales")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(sales, 0);
    }
}
