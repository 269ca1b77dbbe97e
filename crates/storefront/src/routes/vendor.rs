//! Vendor route handlers (approved vendors only).
//!
//! [`RequireVendor`] does the gating: non-vendor accounts are sent to their
//! account dashboard, unapproved vendors get the review-pending 403.

use axum::Json;
use serde::Serialize;
use tracing::instrument;

use meadowlark_core::CustomerId;

use crate::error::Result;
use crate::middleware::RequireVendor;

/// Vendor overview.
#[derive(Debug, Serialize)]
pub struct VendorDashboardView {
    pub customer_id: CustomerId,
    pub email: String,
}

/// Payouts page state. Payout processing is not wired up yet, so the page
/// reports itself as unavailable rather than showing fabricated numbers.
#[derive(Debug, Serialize)]
pub struct PayoutsView {
    pub available: bool,
    pub message: String,
}

/// Vendor dashboard.
#[instrument(skip(vendor))]
pub async fn dashboard(RequireVendor(vendor): RequireVendor) -> Result<Json<VendorDashboardView>> {
    Ok(Json(VendorDashboardView {
        customer_id: vendor.id,
        email: vendor.email,
    }))
}

/// Payouts placeholder.
#[instrument(skip(_vendor))]
pub async fn payouts(RequireVendor(_vendor): RequireVendor) -> Result<Json<PayoutsView>> {
    Ok(Json(PayoutsView {
        available: false,
        message: "Payouts are coming soon. You will be notified when your payout history is available.".to_string(),
    }))
}
