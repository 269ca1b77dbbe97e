//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect to product listing
//! GET  /health                  - Health check
//!
//! # Products
//! GET  /products                - Product listing (cached, coalesced)
//! GET  /products/{handle}       - Product detail
//!
//! # Cart
//! GET    /cart                  - Current cart
//! POST   /cart/items            - Add item (creates cart on first add)
//! POST   /cart/items/{line_id}  - Set quantity (0 removes the line)
//! DELETE /cart/items/{line_id}  - Remove item
//!
//! # Auth
//! POST /auth/login              - Sign in
//! POST /auth/logout             - Sign out
//! POST /auth/register           - Customer registration
//! POST /auth/register/vendor    - Vendor application
//! GET  /auth/me                 - Current session state
//!
//! # Account (requires auth)
//! GET    /account/dashboard     - Account overview
//! GET    /account/addresses     - Saved address list
//! POST   /account/addresses     - Create address
//! POST   /account/addresses/{id}   - Update address
//! DELETE /account/addresses/{id}   - Delete address
//!
//! # Vendor (requires approved vendor)
//! GET  /vendor/dashboard        - Vendor overview
//! GET  /vendor/payouts          - Payouts (placeholder)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod products;
pub mod vendor;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route(
            "/items/{line_id}",
            post(cart::update).delete(cart::remove),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/register/vendor", post(auth::register_vendor))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(account::dashboard))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            post(account::update_address).delete(account::delete_address),
        )
}

/// Create the vendor routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(vendor::dashboard))
        .route("/payouts", get(vendor::payouts))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/vendor", vendor_routes())
}
