//! Cart route handlers.
//!
//! The cart itself lives in the commerce backend; the session holds only the
//! cart id plus a mirrored item count for the badge. A cart is created
//! lazily on the first add, and a stale cart id (expired or foreign) is
//! dropped from the session rather than surfaced as an error.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use meadowlark_core::{CartId, CurrencyCode, LineItemId, Price};

use crate::commerce::{ApiError, Cart, CommerceClient};
use crate::error::{AppError, Result};
use crate::models::session as session_state;
use crate::state::AppState;
use crate::validation::{AddItemForm, UpdateItemForm};

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub variant_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: Option<String>,
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping_total: String,
    pub tax_total: String,
    pub total: String,
}

impl CartView {
    /// An empty cart, shown before the visitor has added anything.
    #[must_use]
    pub fn empty() -> Self {
        let zero = Price::zero(CurrencyCode::Usd).display();
        Self {
            id: None,
            items: Vec::new(),
            item_count: 0,
            subtotal: zero.clone(),
            shipping_total: zero.clone(),
            tax_total: zero.clone(),
            total: zero,
        }
    }
}

fn format_cents(cents: i64) -> String {
    Price::from_cents(cents, CurrencyCode::Usd).display()
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            id: Some(cart.id.to_string()),
            items: cart
                .items
                .iter()
                .map(|item| CartItemView {
                    id: item.id.to_string(),
                    variant_id: item.variant_id.as_ref().map(ToString::to_string),
                    title: item.title.clone(),
                    description: item.description.clone(),
                    thumbnail: item.thumbnail.clone(),
                    quantity: item.quantity,
                    unit_price: format_cents(item.unit_price),
                    line_total: format_cents(
                        item.unit_price.saturating_mul(i64::from(item.quantity)),
                    ),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal: format_cents(cart.subtotal),
            shipping_total: format_cents(cart.shipping_total),
            tax_total: format_cents(cart.tax_total),
            total: format_cents(cart.total),
        }
    }
}

/// Store the refreshed cart in the session and build its view.
async fn commit_cart(session: &Session, cart: &Cart) -> Result<CartView> {
    session_state::set_cart_id(session, &cart.id).await?;
    session_state::set_cart_item_count(session, cart.item_count()).await?;
    Ok(CartView::from(cart))
}

/// Resolve the session's cart id, creating a backend cart on first use.
///
/// The new id is stored in the session before any line-item call, so a
/// rejected add leaves the cart ready for the next attempt instead of
/// orphaning it.
pub async fn ensure_cart_id(client: &CommerceClient, session: &Session) -> Result<CartId> {
    if let Some(cart_id) = session_state::cart_id(session).await? {
        return Ok(cart_id);
    }

    let cart = client.create_cart(None).await?;
    session_state::set_cart_id(session, &cart.id).await?;
    Ok(cart.id)
}

/// Display the current cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let Some(cart_id) = session_state::cart_id(&session).await? else {
        return Ok(Json(CartView::empty()));
    };

    match state.commerce().get_cart(&cart_id).await {
        Ok(cart) => {
            session_state::set_cart_item_count(&session, cart.item_count()).await?;
            Ok(Json(CartView::from(&cart)))
        }
        Err(ApiError::NotFound { .. }) => {
            // Stale cart id from an expired backend cart.
            tracing::warn!(cart_id = %cart_id, "dropping stale cart id from session");
            session_state::clear_cart(&session).await?;
            Ok(Json(CartView::empty()))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Add an item to the cart, creating the cart on first use.
#[instrument(skip(state, session, form), fields(variant_id = %form.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddItemForm>,
) -> Result<Json<CartView>> {
    form.validate()?;

    let cart_id = ensure_cart_id(state.commerce(), &session).await?;

    let variant_id = form.variant_id.clone().into();
    let cart = state
        .commerce()
        .add_line_item(&cart_id, &variant_id, form.quantity)
        .await?;

    Ok(Json(commit_cart(&session, &cart).await?))
}

/// Set a line item's quantity. Zero removes the line.
#[instrument(skip(state, session, form), fields(line_id = %line_id, quantity = form.quantity))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(line_id): Path<String>,
    Json(form): Json<UpdateItemForm>,
) -> Result<Json<CartView>> {
    let Some(cart_id) = session_state::cart_id(&session).await? else {
        return Err(AppError::NotFound("No active cart".to_string()));
    };

    let line_id = LineItemId::new(line_id);
    let cart = state
        .commerce()
        .set_line_quantity(&cart_id, &line_id, form.quantity)
        .await?;

    Ok(Json(commit_cart(&session, &cart).await?))
}

/// Remove a line item.
#[instrument(skip(state, session), fields(line_id = %line_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(line_id): Path<String>,
) -> Result<Json<CartView>> {
    let Some(cart_id) = session_state::cart_id(&session).await? else {
        return Err(AppError::NotFound("No active cart".to_string()));
    };

    let line_id = LineItemId::new(line_id);
    let cart = state
        .commerce()
        .remove_line_item(&cart_id, &line_id)
        .await?;

    Ok(Json(commit_cart(&session, &cart).await?))
}
