//! Authentication route handlers.
//!
//! Login proxies credentials to the commerce backend, captures the backend
//! session cookie, and records the signed-in customer in the local session.
//! The browser only ever sees the storefront's own session cookie.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use meadowlark_core::{CustomerId, CustomerRole, VendorStatus};

use crate::commerce::{Customer, RegisterCustomerPayload, RegisterVendorPayload};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::OptionalAuth;
use crate::models::session as session_state;
use crate::models::session::CurrentCustomer;
use crate::state::AppState;
use crate::validation::{CustomerRegisterForm, LoginForm, VendorRegisterForm};

/// Customer profile as returned by auth endpoints.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: CustomerRole,
    pub vendor_status: Option<VendorStatus>,
    pub business_name: Option<String>,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            email: customer.email.clone(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            role: customer.role,
            vendor_status: customer.vendor_status,
            business_name: customer.business_name.clone(),
        }
    }
}

/// Session snapshot for page chrome: auth flag, who, and the cart badge.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub customer: Option<CurrentCustomerView>,
    pub cart_item_count: u32,
}

#[derive(Debug, Serialize)]
pub struct CurrentCustomerView {
    pub id: CustomerId,
    pub email: String,
    pub role: CustomerRole,
    pub vendor_status: Option<VendorStatus>,
}

/// Sign in.
///
/// A pending vendor account is rejected by the backend with
/// `VENDOR_NOT_APPROVED`; that rejection passes through unchanged so the
/// client can show the review-pending message instead of a generic
/// credentials error.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<CustomerView>> {
    form.validate()?;

    let outcome = state.commerce().login(&form.email, &form.password).await?;
    let token = outcome.token.ok_or_else(|| {
        AppError::Internal("login succeeded without a backend session cookie".to_string())
    })?;

    let current = CurrentCustomer::from_customer(&outcome.customer);
    session_state::sign_in(&session, &current, &token).await?;
    set_sentry_user(&current.id, Some(&current.email));

    tracing::info!(customer_id = %current.id, "customer signed in");
    Ok(Json(CustomerView::from(&outcome.customer)))
}

/// Sign out. Ends the backend session when one exists, then clears local
/// auth state. The visitor's cart is kept.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    if let Some(token) = session_state::backend_token(&session).await? {
        // Best effort; local sign-out proceeds even if the backend call fails.
        if let Err(e) = state.commerce().logout(&token).await {
            tracing::warn!(error = %e, "backend logout failed");
        }
    }

    session_state::sign_out(&session).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Register a customer account. Does not sign the customer in; the client
/// follows up with a login call.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<CustomerRegisterForm>,
) -> Result<(StatusCode, Json<CustomerView>)> {
    form.validate()?;

    let payload = RegisterCustomerPayload {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        password: form.password,
    };
    let customer = state.commerce().register_customer(&payload).await?;

    tracing::info!(customer_id = %customer.id, "customer registered");
    Ok((StatusCode::CREATED, Json(CustomerView::from(&customer))))
}

/// Submit a vendor application. The resulting account stays in
/// `vendor_status = pending` until approved and cannot sign in to the
/// vendor area before then.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register_vendor(
    State(state): State<AppState>,
    Json(form): Json<VendorRegisterForm>,
) -> Result<(StatusCode, Json<CustomerView>)> {
    form.validate()?;

    let payload = RegisterVendorPayload {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        password: form.password,
        business_name: form.business_name,
        business_address_1: form.business_address_1,
        business_city: form.business_city,
        business_postal_code: form.business_postal_code,
        business_country_code: form.business_country_code,
        business_province: form.business_province,
        business_website: form.website,
        tax_id: form.tax_id,
        phone: form.phone,
    };
    let customer = state.commerce().register_vendor(&payload).await?;

    tracing::info!(customer_id = %customer.id, "vendor application submitted");
    Ok((StatusCode::CREATED, Json(CustomerView::from(&customer))))
}

/// Current session state: auth flag, customer summary, cart badge count.
#[instrument(skip(session, auth))]
pub async fn me(session: Session, OptionalAuth(auth): OptionalAuth) -> Result<Json<SessionView>> {
    let cart_item_count = session_state::cart_item_count(&session).await?;

    Ok(Json(SessionView {
        authenticated: auth.is_some(),
        customer: auth.map(|c| CurrentCustomerView {
            id: c.id,
            email: c.email,
            role: c.role,
            vendor_status: c.vendor_status,
        }),
        cart_item_count,
    }))
}
