//! REST client for the commerce backend.
//!
//! One `reqwest` client wraps all backend calls with the configured base
//! URL, JSON content type, and a fixed per-request timeout. Failures are
//! normalized into [`ApiError`] in [`normalize_failure`]; that is the only
//! place in the codebase that inspects backend error bodies.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::SET_COOKIE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use meadowlark_core::{AddressId, CartId, LineItemId, VariantId};

use crate::config::CommerceApiConfig;
use crate::validation::FieldError;

use super::ApiError;
use super::cache;
use super::types::{
    AddressPayload, BACKEND_SESSION_COOKIE, Cart, Customer, LoginOutcome, Product, ProductFilters,
    ProductList, RegisterCustomerPayload, RegisterVendorPayload, SessionToken,
};

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(Deserialize)]
struct CartEnvelope {
    cart: Cart,
}

#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: Customer,
}

/// Backend error body. The backend nests `{code, message, details}` under an
/// `error` key, but some endpoints flatten the same fields to the top level;
/// both shapes collapse here so nothing downstream ever probes them again.
#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce backend REST API.
///
/// Cheap to clone; all state lives behind an `Arc`. Catalog reads are cached
/// for [`CommerceApiConfig::catalog_ttl`] with coalesced loads; cart and
/// customer calls always hit the backend.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    http: reqwest::Client,
    base_url: String,
    products_cache: moka::future::Cache<ProductFilters, ProductList>,
    product_cache: moka::future::Cache<String, Product>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &CommerceApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                products_cache: cache::build(config.catalog_ttl),
                product_cache: cache::build(config.catalog_ttl),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode a JSON body, normalizing failures.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            return Err(normalize_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request whose success response carries no meaningful body.
    async fn send_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.map_err(ApiError::from)?;
            return Err(normalize_failure(status, &body));
        }

        Ok(())
    }

    // =========================================================================
    // Catalog (cached, coalesced)
    // =========================================================================

    /// List products matching the given filters.
    ///
    /// Concurrent calls with identical filters share one in-flight backend
    /// request and one cache entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(q = ?filters.q, offset = ?filters.offset))]
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<ProductList, ApiError> {
        let this = self.clone();
        let load_filters = filters.clone();

        self.inner
            .products_cache
            .try_get_with(filters.clone(), async move {
                this.fetch_products(&load_filters).await
            })
            .await
            .map_err(|e| cache::shared_error(&e))
    }

    async fn fetch_products(&self, filters: &ProductFilters) -> Result<ProductList, ApiError> {
        debug!("fetching product list from backend");
        let request = self
            .inner
            .http
            .get(self.url("/store/products"))
            .query(filters);
        self.send(request).await
    }

    /// Get a product by id or handle.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no such product exists, or another
    /// error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, handle: &str) -> Result<Product, ApiError> {
        let this = self.clone();
        let load_handle = handle.to_string();

        self.inner
            .product_cache
            .try_get_with(handle.to_string(), async move {
                this.fetch_product(&load_handle).await
            })
            .await
            .map_err(|e| cache::shared_error(&e))
    }

    async fn fetch_product(&self, handle: &str) -> Result<Product, ApiError> {
        debug!("fetching product from backend");
        let request = self
            .inner
            .http
            .get(self.url(&format!("/store/products/{handle}")));
        let envelope: ProductEnvelope = self.send(request).await?;
        Ok(envelope.product)
    }

    /// Drop a cached product detail entry.
    pub async fn invalidate_product(&self, handle: &str) {
        self.inner.product_cache.invalidate(handle).await;
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.products_cache.invalidate_all();
        self.inner.product_cache.invalidate_all();
        self.inner.products_cache.run_pending_tasks().await;
        self.inner.product_cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Authenticate with email and password.
    ///
    /// On success, captures the backend's session cookie so authenticated
    /// calls can replay it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] for bad credentials and
    /// [`ApiError::Forbidden`] (code `VENDOR_NOT_APPROVED`) for vendor
    /// accounts still under review.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let response = self
            .inner
            .http
            .post(self.url("/store/auth"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let token = extract_session_cookie(response.headers());
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            return Err(normalize_failure(status, &body));
        }

        let envelope: CustomerEnvelope =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(LoginOutcome {
            customer: envelope.customer,
            token,
        })
    }

    /// Fetch the customer for an active backend session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when the session is missing or
    /// expired; that condition is never swallowed here.
    #[instrument(skip(self, token))]
    pub async fn current_customer(&self, token: &SessionToken) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .get(self.url("/store/auth"))
            .header(reqwest::header::COOKIE, token.cookie_header());
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &SessionToken) -> Result<(), ApiError> {
        let request = self
            .inner
            .http
            .delete(self.url("/store/auth"))
            .header(reqwest::header::COOKIE, token.cookie_header());
        self.send_empty(request).await
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with field errors for rejected
    /// input (e.g. code `EMAIL_ALREADY_EXISTS`).
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn register_customer(
        &self,
        payload: &RegisterCustomerPayload,
    ) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .post(self.url("/store/customers"))
            .json(payload);
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }

    /// Register a new vendor account. The account starts with
    /// `vendor_status = pending` and cannot use the vendor area until
    /// approved.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with field errors for rejected input.
    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn register_vendor(
        &self,
        payload: &RegisterVendorPayload,
    ) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .post(self.url("/store/vendors"))
            .json(payload);
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }

    // =========================================================================
    // Carts (never cached - mutable state)
    // =========================================================================

    /// Create a new cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn create_cart(&self, region_id: Option<&str>) -> Result<Cart, ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(region) = region_id {
            body.insert("region_id".to_string(), serde_json::Value::from(region));
        }

        let request = self
            .inner
            .http
            .post(self.url("/store/carts"))
            .json(&serde_json::Value::Object(body));
        let envelope: CartEnvelope = self.send(request).await?;
        Ok(envelope.cart)
    }

    /// Fetch a cart by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for a stale or foreign cart id.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, ApiError> {
        let request = self
            .inner
            .http
            .get(self.url(&format!("/store/carts/{cart_id}")));
        let envelope: CartEnvelope = self.send(request).await?;
        Ok(envelope.cart)
    }

    /// Add a line item to a cart. The backend snapshots title, thumbnail,
    /// and unit price at add time.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the item or the request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn add_line_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let request = self
            .inner
            .http
            .post(self.url(&format!("/store/carts/{cart_id}/line-items")))
            .json(&serde_json::json!({
                "variant_id": variant_id,
                "quantity": quantity,
            }));
        let envelope: CartEnvelope = self.send(request).await?;
        Ok(envelope.cart)
    }

    /// Update a line item's quantity. The backend requires `quantity >= 1`;
    /// use [`Self::set_line_quantity`] when zero means removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update or the request
    /// fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, line_id = %line_id))]
    pub async fn update_line_item(
        &self,
        cart_id: &CartId,
        line_id: &LineItemId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let request = self
            .inner
            .http
            .post(self.url(&format!("/store/carts/{cart_id}/line-items/{line_id}")))
            .json(&serde_json::json!({ "quantity": quantity }));
        let envelope: CartEnvelope = self.send(request).await?;
        Ok(envelope.cart)
    }

    /// Remove a line item from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, line_id = %line_id))]
    pub async fn remove_line_item(
        &self,
        cart_id: &CartId,
        line_id: &LineItemId,
    ) -> Result<Cart, ApiError> {
        let request = self
            .inner
            .http
            .delete(self.url(&format!("/store/carts/{cart_id}/line-items/{line_id}")));
        let envelope: CartEnvelope = self.send(request).await?;
        Ok(envelope.cart)
    }

    /// Set a line item's quantity, treating zero as removal.
    ///
    /// The update endpoint requires `quantity >= 1`, so a zero is routed to
    /// [`Self::remove_line_item`] instead of being sent as an update.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn set_line_quantity(
        &self,
        cart_id: &CartId,
        line_id: &LineItemId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        if quantity == 0 {
            self.remove_line_item(cart_id, line_id).await
        } else {
            self.update_line_item(cart_id, line_id, quantity).await
        }
    }

    // =========================================================================
    // Customer Profile & Addresses
    // =========================================================================

    /// Fetch the authenticated customer's profile with addresses.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when the session is invalid.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &SessionToken) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .get(self.url("/store/customers/me"))
            .header(reqwest::header::COOKIE, token.cookie_header());
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }

    /// Create a saved address. Returns the refreshed customer profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with field errors for rejected input.
    #[instrument(skip(self, token, payload))]
    pub async fn create_address(
        &self,
        token: &SessionToken,
        payload: &AddressPayload,
    ) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .post(self.url("/store/customers/me/addresses"))
            .header(reqwest::header::COOKIE, token.cookie_header())
            .json(payload);
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }

    /// Update a saved address. Returns the refreshed customer profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] with field errors for rejected input.
    #[instrument(skip(self, token, payload), fields(address_id = %address_id))]
    pub async fn update_address(
        &self,
        token: &SessionToken,
        address_id: &AddressId,
        payload: &AddressPayload,
    ) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .post(self.url(&format!("/store/customers/me/addresses/{address_id}")))
            .header(reqwest::header::COOKIE, token.cookie_header())
            .json(payload);
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }

    /// Delete a saved address. Returns the refreshed customer profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self, token), fields(address_id = %address_id))]
    pub async fn delete_address(
        &self,
        token: &SessionToken,
        address_id: &AddressId,
    ) -> Result<Customer, ApiError> {
        let request = self
            .inner
            .http
            .delete(self.url(&format!("/store/customers/me/addresses/{address_id}")))
            .header(reqwest::header::COOKIE, token.cookie_header());
        let envelope: CustomerEnvelope = self.send(request).await?;
        Ok(envelope.customer)
    }
}

// =============================================================================
// Error Normalization
// =============================================================================

/// Classify a non-success backend response into the canonical taxonomy.
fn normalize_failure(status: StatusCode, body: &str) -> ApiError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let nested = envelope.error.unwrap_or_default();

    let code = nested.code.or(envelope.code);
    let message = nested
        .message
        .or(envelope.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    let details = nested.details.or(envelope.details);

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthenticated { message },
        StatusCode::FORBIDDEN => ApiError::Forbidden { code, message },
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        s if s.is_client_error() => ApiError::Validation {
            code,
            message,
            fields: parse_field_errors(details.as_ref()),
        },
        s => ApiError::Server {
            status: s.as_u16(),
            message,
        },
    }
}

/// Pull `{field, message}` pairs out of an error body's `details`.
fn parse_field_errors(details: Option<&serde_json::Value>) -> Vec<FieldError> {
    let Some(serde_json::Value::Array(entries)) = details else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let field = entry.get("field")?.as_str()?;
            let message = entry.get("message")?.as_str()?;
            Some(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            })
        })
        .collect()
}

/// Extract the backend session cookie from response headers.
fn extract_session_cookie(headers: &reqwest::header::HeaderMap) -> Option<SessionToken> {
    headers.get_all(SET_COOKIE).iter().find_map(|value| {
        let raw = value.to_str().ok()?;
        let (name, rest) = raw.split_once('=')?;
        if name.trim() != BACKEND_SESSION_COOKIE {
            return None;
        }
        let cookie_value = rest.split(';').next()?.trim();
        Some(SessionToken::new(cookie_value))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_401() {
        let err = normalize_failure(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":"INVALID_CREDENTIALS","message":"Invalid email or password."}}"#,
        );
        assert_eq!(
            err,
            ApiError::Unauthenticated {
                message: "Invalid email or password.".to_string()
            }
        );
    }

    #[test]
    fn test_normalize_403_keeps_code() {
        let err = normalize_failure(
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":"VENDOR_NOT_APPROVED","message":"Your vendor application is pending review."}}"#,
        );
        assert_eq!(err.code(), Some("VENDOR_NOT_APPROVED"));
        assert!(err.to_string().contains("pending review"));
    }

    #[test]
    fn test_normalize_422_with_top_level_details() {
        // Some endpoints flatten `details` next to the `error` object.
        let err = normalize_failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error":{"code":"VALIDATION_ERROR","message":"Password must be at least 8 characters."},"details":[{"field":"password","message":"Too short"}]}"#,
        );
        let ApiError::Validation { code, fields, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(code.as_deref(), Some("VALIDATION_ERROR"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "password");
    }

    #[test]
    fn test_normalize_flat_error_shape() {
        let err = normalize_failure(
            StatusCode::BAD_REQUEST,
            r#"{"code":"INVALID_INPUT","message":"Bad payload."}"#,
        );
        let ApiError::Validation { code, message, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(code.as_deref(), Some("INVALID_INPUT"));
        assert_eq!(message, "Bad payload.");
    }

    #[test]
    fn test_normalize_unparseable_body_falls_back() {
        let err = normalize_failure(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(
            err,
            ApiError::Server {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_extract_session_cookie() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(
            SET_COOKIE,
            "connect.sid=mock-session-id; Path=/; HttpOnly".parse().unwrap(),
        );

        let token = extract_session_cookie(&headers).unwrap();
        assert_eq!(token.cookie_header(), "connect.sid=mock-session-id");
    }

    #[test]
    fn test_extract_session_cookie_ignores_other_cookies() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(SET_COOKIE, "other=value; Path=/".parse().unwrap());
        assert!(extract_session_cookie(&headers).is_none());
    }
}
