//! Role and status enums for customers and vendors.

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated customer account.
///
/// Serialized in `snake_case` to match the backend's `role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerRole {
    /// Regular shopper.
    #[default]
    Customer,
    /// Marketplace seller. Access is additionally gated by [`VendorStatus`].
    Vendor,
    /// Platform administrator.
    Admin,
}

impl CustomerRole {
    /// Whether this role grants access to the vendor area.
    #[must_use]
    pub const fn is_vendor(self) -> bool {
        matches!(self, Self::Vendor)
    }
}

/// Approval state of a vendor application.
///
/// Only present on accounts with [`CustomerRole::Vendor`]; a vendor may log
/// in but cannot access the vendor dashboard until approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    /// Application submitted, awaiting review.
    #[default]
    Pending,
    /// Approved - full vendor access.
    Approved,
    /// Application rejected.
    Rejected,
}
