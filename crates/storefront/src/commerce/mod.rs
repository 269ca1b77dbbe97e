//! Commerce backend API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog, carts, and customers -
//!   NO local sync, direct REST calls
//! - Every backend failure is normalized exactly once, at this boundary,
//!   into the [`ApiError`] taxonomy; downstream code pattern-matches instead
//!   of probing response shapes
//! - Catalog reads are cached in-memory via `moka` with coalesced loads:
//!   concurrent requests for the same key share one in-flight fetch
//! - Carts and customer data are never cached (mutable state)
//! - Mutations are issued exactly once; no automatic retry
//!
//! # Example
//!
//! ```rust,ignore
//! use meadowlark_storefront::commerce::CommerceClient;
//!
//! let client = CommerceClient::new(&config.commerce)?;
//!
//! // Browse the catalog
//! let product = client.get_product("test-probiotic-a").await?;
//!
//! // Create a cart and add an item
//! let cart = client.create_cart(None).await?;
//! let cart = client.add_line_item(&cart.id, &product.variants[0].id, 1).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use thiserror::Error;

use crate::validation::FieldError;

/// Errors that can occur when interacting with the commerce backend.
///
/// All variants hold owned data so the error can be cloned out of the
/// coalescing cache (`moka` hands shared errors out behind an `Arc`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response received (connection refused, DNS failure, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// 401 - session missing or expired. Never swallowed; the consuming
    /// layer decides how to invalidate the session.
    #[error("not authenticated: {message}")]
    Unauthenticated {
        /// Backend-provided message, if any.
        message: String,
    },

    /// 403 - authenticated but not allowed. Carries the backend code so
    /// callers can distinguish e.g. a pending vendor application.
    #[error("forbidden: {message}")]
    Forbidden {
        /// Backend error code (e.g. `VENDOR_NOT_APPROVED`).
        code: Option<String>,
        /// Backend-provided message.
        message: String,
    },

    /// Structured 4xx rejection. Field errors are surfaced verbatim so forms
    /// can map them back onto individual fields.
    #[error("validation failed: {message}")]
    Validation {
        /// Backend error code (e.g. `EMAIL_ALREADY_EXISTS`).
        code: Option<String>,
        /// Backend-provided message.
        message: String,
        /// Field-scoped errors from the error body's `details`.
        fields: Vec<FieldError>,
    },

    /// 404 - resource does not exist (or a stale cart id).
    #[error("not found: {message}")]
    NotFound {
        /// Backend-provided message.
        message: String,
    },

    /// 5xx - backend failure. Reported to error telemetry by the app layer.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Backend-provided message (not shown to end users).
        message: String,
    },

    /// The response body could not be parsed.
    #[error("response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this error should be captured to error telemetry.
    ///
    /// Client-scoped failures (auth, validation, not-found) are expected
    /// traffic; infrastructure failures are not.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::Server { .. } | Self::Decode(_)
        )
    }

    /// Backend error code, when the backend sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Forbidden { code, .. } | Self::Validation { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
