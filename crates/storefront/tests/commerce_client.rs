//! Integration tests for the commerce client against a mock backend.
//!
//! Each test spins up its own in-process mock server on an ephemeral port,
//! so tests stay independent and can run in parallel.

mod support;

use meadowlark_core::LineItemId;
use meadowlark_storefront::commerce::{ApiError, ProductFilters};

use support::MockBackend;

// =============================================================================
// Catalog Caching
// =============================================================================

#[tokio::test]
async fn test_concurrent_product_lists_share_one_backend_request() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    let filters = ProductFilters::default();

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let client = client.clone();
            let filters = filters.clone();
            tokio::spawn(async move { client.list_products(&filters).await })
        })
        .collect();

    for task in tasks {
        let list = task.await.expect("join").expect("list products");
        assert_eq!(list.products.len(), 2);
    }

    // All ten callers were served by a single backend request.
    assert_eq!(backend.product_list_hits(), 1);
}

#[tokio::test]
async fn test_distinct_filters_fetch_separately() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let all = client
        .list_products(&ProductFilters::default())
        .await
        .expect("unfiltered list");
    assert_eq!(all.products.len(), 2);

    let filtered = client
        .list_products(&ProductFilters {
            q: Some("probiotic".to_string()),
            ..ProductFilters::default()
        })
        .await
        .expect("filtered list");
    assert_eq!(filtered.products.len(), 1);
    assert_eq!(filtered.products[0].title, "Test Probiotic A");

    // Different filter sets are different cache keys.
    assert_eq!(backend.product_list_hits(), 2);

    // Repeating either query is served from cache.
    client
        .list_products(&ProductFilters::default())
        .await
        .expect("cached list");
    assert_eq!(backend.product_list_hits(), 2);
}

#[tokio::test]
async fn test_invalidate_catalog_forces_refetch() {
    let backend = MockBackend::start().await;
    let client = backend.client();
    let filters = ProductFilters::default();

    client.list_products(&filters).await.expect("first fetch");
    client.invalidate_catalog().await;
    client.list_products(&filters).await.expect("second fetch");

    assert_eq!(backend.product_list_hits(), 2);
}

#[tokio::test]
async fn test_product_detail_cached_until_invalidated() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    client.get_product("prod_1").await.expect("first fetch");
    client.get_product("prod_1").await.expect("cached fetch");
    assert_eq!(backend.product_detail_hits(), 1);

    client.invalidate_product("prod_1").await;
    client.get_product("prod_1").await.expect("refetch");
    assert_eq!(backend.product_detail_hits(), 2);
}

#[tokio::test]
async fn test_product_not_found() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let err = client
        .get_product("prod_missing")
        .await
        .expect_err("missing product");
    assert!(matches!(err, ApiError::NotFound { .. }));

    // Failed loads are not cached: the retry reaches the backend again.
    client
        .get_product("prod_missing")
        .await
        .expect_err("still missing");
    assert_eq!(backend.product_detail_hits(), 2);
}

#[tokio::test]
async fn test_backend_unreachable_is_network_error() {
    // Nothing listens on this port.
    let client = support::unreachable_client();

    let err = client
        .list_products(&ProductFilters::default())
        .await
        .expect_err("unreachable backend");
    assert!(matches!(err, ApiError::Network(_)));
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_login_captures_backend_session() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let outcome = client
        .login("test@example.com", "password")
        .await
        .expect("login");
    assert_eq!(outcome.customer.email, "test@example.com");

    let token = outcome.token.expect("session token captured");
    let customer = client.current_customer(&token).await.expect("me");
    assert_eq!(customer.id, outcome.customer.id);

    client.logout(&token).await.expect("logout");
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let err = client
        .login("test@example.com", "wrong")
        .await
        .expect_err("bad credentials");
    assert_eq!(
        err,
        ApiError::Unauthenticated {
            message: "Invalid email or password.".to_string()
        }
    );
}

#[tokio::test]
async fn test_pending_vendor_login_is_distinct_from_bad_credentials() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let err = client
        .login("pending@example.com", "password")
        .await
        .expect_err("pending vendor");

    // The pending review rejection keeps its code and message so the client
    // can show it instead of a generic credentials error.
    let ApiError::Forbidden { code, message } = err else {
        panic!("expected forbidden, got another variant");
    };
    assert_eq!(code.as_deref(), Some("VENDOR_NOT_APPROVED"));
    assert_eq!(message, "Your vendor application is pending review.");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let payload = meadowlark_storefront::commerce::RegisterCustomerPayload {
        first_name: "Test".to_string(),
        last_name: "Customer".to_string(),
        email: "exists@example.com".to_string(),
        password: "password123".to_string(),
    };
    let err = client
        .register_customer(&payload)
        .await
        .expect_err("duplicate email");

    let ApiError::Validation { code, .. } = err else {
        panic!("expected validation error");
    };
    assert_eq!(code.as_deref(), Some("EMAIL_ALREADY_EXISTS"));
}

#[tokio::test]
async fn test_session_token_required_for_profile() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let stale = meadowlark_storefront::commerce::SessionToken::new("expired-session");
    let err = client.me(&stale).await.expect_err("stale token");
    assert!(matches!(err, ApiError::Unauthenticated { .. }));
}

// =============================================================================
// Carts
// =============================================================================

#[tokio::test]
async fn test_cart_totals_accumulate() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let cart = client.create_cart(None).await.expect("create cart");
    let cart = client
        .add_line_item(&cart.id, &"variant_1".into(), 2)
        .await
        .expect("add probiotic");
    let cart = client
        .add_line_item(&cart.id, &"variant_3".into(), 1)
        .await
        .expect("add kit");

    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.subtotal, 2 * 2999 + 9999);
    assert_eq!(cart.total, 8997);
}

#[tokio::test]
async fn test_set_line_quantity_zero_routes_to_removal() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let cart = client.create_cart(None).await.expect("create cart");
    let cart = client
        .add_line_item(&cart.id, &"variant_1".into(), 2)
        .await
        .expect("add item");
    let line_id = cart.items[0].id.clone();

    let cart = client
        .set_line_quantity(&cart.id, &line_id, 0)
        .await
        .expect("set quantity zero");
    assert!(cart.items.is_empty());

    // The backend saw a removal, never a zero-quantity update.
    let ops = backend.ops();
    assert!(ops.contains(&format!("remove:{line_id}")));
    assert!(!ops.iter().any(|op| op.starts_with("update:")));
}

#[tokio::test]
async fn test_set_line_quantity_positive_updates_in_place() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let cart = client.create_cart(None).await.expect("create cart");
    let cart = client
        .add_line_item(&cart.id, &"variant_1".into(), 1)
        .await
        .expect("add item");
    let line_id = cart.items[0].id.clone();

    let cart = client
        .set_line_quantity(&cart.id, &line_id, 3)
        .await
        .expect("set quantity");
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.subtotal, 3 * 2999);

    assert!(backend.ops().contains(&format!("update:{line_id}:3")));
}

#[tokio::test]
async fn test_stale_cart_id_not_found() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let err = client
        .get_cart(&"cart_expired".into())
        .await
        .expect_err("stale cart");
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn test_removed_line_keeps_rest_of_cart() {
    let backend = MockBackend::start().await;
    let client = backend.client();

    let cart = client.create_cart(None).await.expect("create cart");
    client
        .add_line_item(&cart.id, &"variant_1".into(), 2)
        .await
        .expect("add probiotic");
    let with_both = client
        .add_line_item(&cart.id, &"variant_3".into(), 1)
        .await
        .expect("add kit");

    let kit_line: LineItemId = with_both
        .items
        .iter()
        .find(|i| i.title == "Test Kit B")
        .map(|i| i.id.clone())
        .expect("kit line");

    let cart = client
        .remove_line_item(&cart.id, &kit_line)
        .await
        .expect("remove kit");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].title, "Test Probiotic A");
    assert_eq!(cart.subtotal, 2 * 2999);
}
