//! Database operations for the storefront `PostgreSQL` instance.
//!
//! The commerce backend is the source of truth for products, carts, and
//! customers; the local database stores session state only.
//!
//! ## Tables
//!
//! - `sessions` - Tower-sessions storage (created by the session store's
//!   own migration at startup)

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
