//! Account route handlers (signed-in customers).
//!
//! Every handler here takes [`RequireAuth`], so guests are redirected before
//! any backend call. The backend session can still expire independently of
//! the local one; when the backend answers 401 the local auth state is
//! cleared so the next request starts the login flow cleanly.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use meadowlark_core::AddressId;

use crate::commerce::{Address, AddressPayload, ApiError, Customer, SessionToken};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::session as session_state;
use crate::routes::auth::CustomerView;
use crate::state::AppState;
use crate::validation::AddressForm;

/// A saved address as shown in the address book.
#[derive(Debug, Serialize)]
pub struct AddressView {
    pub id: AddressId,
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub province: Option<String>,
    pub postal_code: String,
    pub country_code: String,
    pub phone: Option<String>,
    pub is_default_shipping: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.clone(),
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            address_1: address.address_1.clone(),
            address_2: address.address_2.clone(),
            city: address.city.clone(),
            province: address.province.clone(),
            postal_code: address.postal_code.clone(),
            country_code: address.country_code.clone(),
            phone: address.phone.clone(),
            is_default_shipping: address.is_default_shipping,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddressListView {
    pub addresses: Vec<AddressView>,
}

fn address_list(customer: &Customer) -> AddressListView {
    AddressListView {
        addresses: customer
            .shipping_addresses
            .iter()
            .map(AddressView::from)
            .collect(),
    }
}

/// Fetch the backend token or fail as unauthorized.
async fn require_backend_token(session: &Session) -> Result<SessionToken> {
    session_state::backend_token(session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session expired, please sign in again".to_string()))
}

/// Clear local auth when the backend no longer recognizes the session.
async fn handle_expired_session(session: &Session, err: ApiError) -> AppError {
    if matches!(err, ApiError::Unauthenticated { .. }) {
        if let Err(e) = session_state::sign_out(session).await {
            tracing::warn!(error = %e, "failed to clear stale auth state");
        }
    }
    AppError::from(err)
}

/// Account overview: the fresh profile from the backend.
#[instrument(skip(state, session, auth))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<CustomerView>> {
    let token = require_backend_token(&session).await?;
    let customer = match state.commerce().me(&token).await {
        Ok(customer) => customer,
        Err(e) => return Err(handle_expired_session(&session, e).await),
    };

    tracing::debug!(customer_id = %auth.id, "loaded account dashboard");
    Ok(Json(CustomerView::from(&customer)))
}

/// Saved address list.
#[instrument(skip(state, session, _auth))]
pub async fn addresses(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_auth): RequireAuth,
) -> Result<Json<AddressListView>> {
    let token = require_backend_token(&session).await?;
    match state.commerce().me(&token).await {
        Ok(customer) => Ok(Json(address_list(&customer))),
        Err(e) => Err(handle_expired_session(&session, e).await),
    }
}

/// Create a saved address.
#[instrument(skip(state, session, _auth, form))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_auth): RequireAuth,
    Json(form): Json<AddressForm>,
) -> Result<Json<AddressListView>> {
    form.validate()?;
    let token = require_backend_token(&session).await?;

    match state
        .commerce()
        .create_address(&token, &payload_from(form))
        .await
    {
        Ok(customer) => Ok(Json(address_list(&customer))),
        Err(e) => Err(handle_expired_session(&session, e).await),
    }
}

/// Update a saved address.
#[instrument(skip(state, session, _auth, form), fields(address_id = %id))]
pub async fn update_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_auth): RequireAuth,
    Path(id): Path<String>,
    Json(form): Json<AddressForm>,
) -> Result<Json<AddressListView>> {
    form.validate()?;
    let token = require_backend_token(&session).await?;
    let address_id = AddressId::new(id);

    match state
        .commerce()
        .update_address(&token, &address_id, &payload_from(form))
        .await
    {
        Ok(customer) => Ok(Json(address_list(&customer))),
        Err(e) => Err(handle_expired_session(&session, e).await),
    }
}

/// Delete a saved address.
#[instrument(skip(state, session, _auth), fields(address_id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_auth): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<AddressListView>> {
    let token = require_backend_token(&session).await?;
    let address_id = AddressId::new(id);

    match state.commerce().delete_address(&token, &address_id).await {
        Ok(customer) => Ok(Json(address_list(&customer))),
        Err(e) => Err(handle_expired_session(&session, e).await),
    }
}

fn payload_from(form: AddressForm) -> AddressPayload {
    AddressPayload {
        first_name: form.first_name,
        last_name: form.last_name,
        address_1: form.address_1,
        address_2: form.address_2,
        city: form.city,
        postal_code: form.postal_code,
        country_code: form.country_code,
        province: form.province,
        phone: form.phone,
        company: form.company,
    }
}
