//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::commerce::{ApiError, CommerceClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the commerce client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    commerce: CommerceClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the commerce client cannot be constructed.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, ApiError> {
        let commerce = CommerceClient::new(&config.commerce)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                commerce,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the commerce API client.
    #[must_use]
    pub fn commerce(&self) -> &CommerceClient {
        &self.inner.commerce
    }
}
