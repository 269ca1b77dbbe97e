//! Authentication extractors.
//!
//! Route gating happens through extractors rather than a route-table match:
//! a handler that takes [`RequireAuth`] can only run with a signed-in
//! customer, and one that takes [`RequireVendor`] only with an approved
//! vendor. Guests hitting a protected route are redirected to the login
//! page.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use meadowlark_core::VendorStatus;

use crate::models::session::{CURRENT_CUSTOMER_KEY, CurrentCustomer};

/// Extractor that requires a signed-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn account_page(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection for a request that needed authentication.
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing or the session store failed.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is placed in extensions by SessionManagerLayer.
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::SessionUnavailable)?;

        let customer: Option<CurrentCustomer> =
            session.get(CURRENT_CUSTOMER_KEY).await.map_err(|e| {
                tracing::error!(error = %e, "failed to load session");
                AuthRejection::SessionUnavailable
            })?;

        customer.map(Self).ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally reads the signed-in customer.
///
/// Never rejects; guests yield `None`.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(CURRENT_CUSTOMER_KEY)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Extractor that requires an approved vendor account.
///
/// Customers without the vendor role are sent back to their account
/// dashboard. Vendor accounts that are still pending (or were rejected) get
/// a 403 explaining that the application is under review.
pub struct RequireVendor(pub CurrentCustomer);

pub enum VendorRejection {
    /// Not signed in at all.
    Auth(AuthRejection),
    /// Signed in, but not a vendor account.
    NotVendor,
    /// A vendor account that has not been approved.
    NotApproved,
}

impl IntoResponse for VendorRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(rejection) => rejection.into_response(),
            Self::NotVendor => Redirect::to("/account/dashboard").into_response(),
            Self::NotApproved => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({
                    "error": {
                        "code": "VENDOR_NOT_APPROVED",
                        "message": "Your vendor application is pending review.",
                    }
                })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireVendor
where
    S: Send + Sync,
{
    type Rejection = VendorRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(customer) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(VendorRejection::Auth)?;

        if !customer.role.is_vendor() {
            return Err(VendorRejection::NotVendor);
        }
        if customer.vendor_status != Some(VendorStatus::Approved) {
            return Err(VendorRejection::NotApproved);
        }

        Ok(Self(customer))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use meadowlark_core::{CustomerId, CustomerRole};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn parts_with_session(uri: &str, session: Session) -> Parts {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn test_guest_is_redirected_to_login_on_every_path() {
        for uri in ["/account/dashboard", "/cart/items", "/vendor/payouts"] {
            let mut parts = parts_with_session(uri, session());
            let result = RequireAuth::from_request_parts(&mut parts, &()).await;
            assert!(
                matches!(result, Err(AuthRejection::RedirectToLogin)),
                "expected login redirect for {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_a_server_error() {
        let (mut parts, ()) = Request::builder()
            .uri("/account/dashboard")
            .body(())
            .unwrap()
            .into_parts();
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::SessionUnavailable)));
    }

    #[tokio::test]
    async fn test_signed_in_customer_passes() {
        let session = session();
        session
            .insert(
                CURRENT_CUSTOMER_KEY,
                CurrentCustomer {
                    id: CustomerId::new("cus_123"),
                    email: "test@example.com".to_string(),
                    role: CustomerRole::Customer,
                    vendor_status: None,
                },
            )
            .await
            .unwrap();

        let mut parts = parts_with_session("/account/dashboard", session);
        let Ok(RequireAuth(customer)) = RequireAuth::from_request_parts(&mut parts, &()).await
        else {
            panic!("expected extraction to succeed");
        };
        assert_eq!(customer.email, "test@example.com");
    }
}
