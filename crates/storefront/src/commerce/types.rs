//! Domain types for the commerce backend API.
//!
//! These are plain records mirrored from backend responses; the storefront
//! does not own or persist them beyond ephemeral cache and session state.
//! Monetary amounts arrive in the smallest currency unit (cents).

use serde::{Deserialize, Serialize};

use meadowlark_core::{
    AddressId, CartId, CustomerId, CustomerRole, LineItemId, ProductId, VariantId, VendorStatus,
};

// =============================================================================
// Catalog Types
// =============================================================================

/// A per-currency price entry on a variant, in minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPrice {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// ISO 4217 currency code (lowercase, e.g. `usd`).
    pub currency_code: String,
}

/// A product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Image ID.
    pub id: String,
    /// Image URL.
    pub url: String,
}

/// A specific value of a product option (e.g. "Large").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOptionValue {
    /// Option value ID.
    pub id: String,
    /// The value itself.
    pub value: String,
}

/// A product option type (e.g. "Size").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option ID.
    pub id: String,
    /// Option title.
    pub title: String,
    /// Available values.
    #[serde(default)]
    pub values: Vec<ProductOptionValue>,
}

/// A product variant (purchasable unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (e.g. "Standard").
    #[serde(default)]
    pub title: Option<String>,
    /// Stock-keeping unit.
    #[serde(default)]
    pub sku: Option<String>,
    /// Available stock, when inventory is tracked.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    /// Per-currency price entries.
    #[serde(default)]
    pub prices: Vec<VariantPrice>,
}

impl ProductVariant {
    /// The price entry for a currency, if the variant carries one.
    #[must_use]
    pub fn price_in(&self, currency_code: &str) -> Option<&VariantPrice> {
        self.prices.iter().find(|p| p.currency_code == currency_code)
    }
}

/// A product in the marketplace catalog. Read-only from the storefront's
/// point of view; list responses omit the detail-only fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// URL handle.
    #[serde(default)]
    pub handle: Option<String>,
    /// Optional subtitle.
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Plain text description (detail responses only).
    #[serde(default)]
    pub description: Option<String>,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Gallery images (detail responses only).
    #[serde(default)]
    pub images: Vec<Image>,
    /// Product options (detail responses only).
    #[serde(default)]
    pub options: Vec<ProductOption>,
    /// Variants with price entries.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    /// Display name of the selling vendor.
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Average review rating.
    #[serde(default)]
    pub average_rating: Option<f64>,
    /// Number of reviews.
    #[serde(default)]
    pub review_count: Option<i64>,
}

/// A page of products with pagination bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductList {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Total matching products.
    pub count: i64,
    /// Page size used.
    pub limit: i64,
    /// Page offset used.
    pub offset: i64,
}

/// Query parameters for product listing. Participates in the catalog cache
/// key, so distinct filter sets never collide in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProductFilters {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Free-text search query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Region scope for pricing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line item in a cart. Title, description, and thumbnail are display
/// snapshots taken when the item was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Line item ID.
    pub id: LineItemId,
    /// The variant this line purchases.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    /// Product title snapshot.
    pub title: String,
    /// Variant title snapshot.
    #[serde(default)]
    pub description: Option<String>,
    /// Thumbnail URL snapshot.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Quantity, always >= 1 (quantity 0 is modeled as removal).
    pub quantity: u32,
    /// Unit price snapshot in cents.
    pub unit_price: i64,
}

/// A shopping cart. Created by the backend on first use; the storefront
/// only ever holds its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Customer the cart belongs to, once associated.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Email associated with the cart.
    #[serde(default)]
    pub email: Option<String>,
    /// Pricing region.
    #[serde(default)]
    pub region_id: Option<String>,
    /// Ordered line items.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Items subtotal in cents.
    #[serde(default)]
    pub subtotal: i64,
    /// Shipping total in cents.
    #[serde(default)]
    pub shipping_total: i64,
    /// Tax total in cents.
    #[serde(default)]
    pub tax_total: i64,
    /// Grand total in cents.
    #[serde(default)]
    pub total: i64,
}

impl Cart {
    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Find a line item by id.
    #[must_use]
    pub fn line(&self, line_id: &LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == line_id)
    }
}

// =============================================================================
// Customer Types
// =============================================================================

/// A customer's saved shipping/billing address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Address ID.
    pub id: AddressId,
    /// Recipient first name.
    pub first_name: String,
    /// Recipient last name.
    pub last_name: String,
    /// Street address.
    pub address_1: String,
    /// Apartment, suite, etc.
    #[serde(default)]
    pub address_2: Option<String>,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Two-letter country code.
    pub country_code: String,
    /// State/province.
    #[serde(default)]
    pub province: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Company name.
    #[serde(default)]
    pub company: Option<String>,
    /// Whether this is the default shipping address.
    #[serde(default)]
    pub is_default_shipping: bool,
    /// Whether this is the default billing address.
    #[serde(default)]
    pub is_default_billing: bool,
}

/// An authenticated customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Account email.
    pub email: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Account role.
    #[serde(default)]
    pub role: CustomerRole,
    /// Vendor approval state; only present for vendor accounts.
    #[serde(default)]
    pub vendor_status: Option<VendorStatus>,
    /// Vendor business name; only present for vendor accounts.
    #[serde(default)]
    pub business_name: Option<String>,
    /// Saved addresses.
    #[serde(default)]
    pub shipping_addresses: Vec<Address>,
}

// =============================================================================
// Session Token
// =============================================================================

/// Name of the session cookie issued by the commerce backend.
pub const BACKEND_SESSION_COOKIE: &str = "connect.sid";

/// The backend's session cookie value, captured at login and replayed on
/// authenticated calls. Stored server-side in the visitor's session; never
/// sent to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw cookie value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Render the `Cookie` header value for backend requests.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("{BACKEND_SESSION_COOKIE}={}", self.0)
    }
}

/// Result of a successful login: the authenticated customer plus the backend
/// session cookie to replay on subsequent authenticated calls.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated customer.
    pub customer: Customer,
    /// Backend session token, when the backend issued one.
    pub token: Option<SessionToken>,
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Payload for customer registration (`POST /store/customers`).
#[derive(Debug, Clone, Serialize)]
pub struct RegisterCustomerPayload {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Payload for vendor registration (`POST /store/vendors`).
#[derive(Debug, Clone, Serialize)]
pub struct RegisterVendorPayload {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Legal business name.
    pub business_name: String,
    /// Business street address.
    pub business_address_1: String,
    /// Business city.
    pub business_city: String,
    /// Business postal code.
    pub business_postal_code: String,
    /// Two-letter business country code.
    pub business_country_code: String,
    /// Business state/province.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_province: Option<String>,
    /// Business website URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_website: Option<String>,
    /// Tax identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Payload for creating or updating an address
/// (`POST /store/customers/me/addresses[/:id]`).
#[derive(Debug, Clone, Serialize)]
pub struct AddressPayload {
    /// Recipient first name.
    pub first_name: String,
    /// Recipient last name.
    pub last_name: String,
    /// Street address.
    pub address_1: String,
    /// Apartment, suite, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Two-letter country code.
    pub country_code: String,
    /// State/province.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Company name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}
