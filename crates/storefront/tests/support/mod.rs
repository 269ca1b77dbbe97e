//! In-process mock of the commerce backend.
//!
//! A small stateful axum server bound to an ephemeral port. It serves fixed
//! catalog fixtures, tracks how many times the product listing endpoint was
//! hit, and records every cart mutation so tests can assert on which
//! backend operations a client call produced.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use meadowlark_storefront::commerce::CommerceClient;
use meadowlark_storefront::config::CommerceApiConfig;

pub const SESSION_COOKIE: &str = "connect.sid=mock-session-id";

#[derive(Clone)]
struct MockItem {
    id: String,
    variant_id: String,
    title: String,
    quantity: u32,
    unit_price: i64,
}

#[derive(Default)]
struct MockState {
    product_list_hits: AtomicUsize,
    product_detail_hits: AtomicUsize,
    ops: Mutex<Vec<String>>,
    carts: Mutex<HashMap<String, Vec<MockItem>>>,
    next_cart: AtomicUsize,
    next_item: AtomicUsize,
}

/// Handle to the running mock backend.
pub struct MockBackend {
    state: Arc<MockState>,
    addr: SocketAddr,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/store/products", get(list_products))
            .route("/store/products/{handle}", get(get_product))
            .route("/store/auth", post(login).get(current_customer).delete(logout))
            .route("/store/customers", post(register_customer))
            .route("/store/vendors", post(register_vendor))
            .route("/store/customers/me", get(me))
            .route("/store/carts", post(create_cart))
            .route("/store/carts/{id}", get(get_cart))
            .route("/store/carts/{id}/line-items", post(add_item))
            .route(
                "/store/carts/{id}/line-items/{line_id}",
                post(update_item).delete(remove_item),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend serve");
        });

        Self { state, addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Build a commerce client pointed at this backend.
    pub fn client(&self) -> CommerceClient {
        CommerceClient::new(&CommerceApiConfig {
            base_url: self.url(),
            timeout: Duration::from_secs(5),
            catalog_ttl: Duration::from_secs(60),
        })
        .expect("build commerce client")
    }

    /// Number of requests the product listing endpoint has served.
    pub fn product_list_hits(&self) -> usize {
        self.state.product_list_hits.load(Ordering::SeqCst)
    }

    /// Number of requests the product detail endpoint has served.
    pub fn product_detail_hits(&self) -> usize {
        self.state.product_detail_hits.load(Ordering::SeqCst)
    }

    /// Cart operations in the order the backend received them.
    pub fn ops(&self) -> Vec<String> {
        self.state.ops.lock().expect("ops lock").clone()
    }
}

/// A client pointed at a port nothing listens on, with a short timeout.
pub fn unreachable_client() -> CommerceClient {
    CommerceClient::new(&CommerceApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        catalog_ttl: Duration::from_secs(60),
    })
    .expect("build commerce client")
}

// =============================================================================
// Fixtures
// =============================================================================

fn variant_catalog() -> Vec<(&'static str, &'static str, i64)> {
    vec![
        ("variant_1", "Test Probiotic A", 2999),
        ("variant_3", "Test Kit B", 9999),
    ]
}

fn product_fixture(id: &str, title: &str, variant: &str, cents: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "handle": id,
        "thumbnail": format!("https://cdn.example.com/{id}.jpg"),
        "variants": [{
            "id": variant,
            "title": "Standard",
            "inventory_quantity": 10,
            "prices": [{ "amount": cents, "currency_code": "usd" }],
        }],
        "vendor_name": "Test Vendor Co",
    })
}

fn customer_fixture(role: &str, vendor_status: Option<&str>) -> Value {
    let mut customer = json!({
        "id": "cus_123",
        "email": "test@example.com",
        "first_name": "Test",
        "last_name": "Customer",
        "role": role,
        "shipping_addresses": [],
    });
    if let Some(status) = vendor_status {
        customer["vendor_status"] = json!(status);
    }
    customer
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": code, "message": message } })),
    )
        .into_response()
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("connect.sid=mock-session-id"))
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    q: Option<String>,
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    state.product_list_hits.fetch_add(1, Ordering::SeqCst);

    // Give concurrent callers time to pile up on the in-flight request.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut products = vec![
        product_fixture("prod_1", "Test Probiotic A", "variant_1", 2999),
        product_fixture("prod_2", "Test Kit B", "variant_3", 9999),
    ];
    if let Some(q) = &query.q {
        products.retain(|p| {
            p["title"]
                .as_str()
                .is_some_and(|t| t.to_lowercase().contains(&q.to_lowercase()))
        });
    }

    let count = products.len();
    Json(json!({
        "products": products,
        "count": count,
        "limit": 20,
        "offset": 0,
    }))
}

async fn get_product(State(state): State<Arc<MockState>>, Path(handle): Path<String>) -> Response {
    state.product_detail_hits.fetch_add(1, Ordering::SeqCst);
    match handle.as_str() {
        "prod_1" => Json(json!({
            "product": product_fixture("prod_1", "Test Probiotic A", "variant_1", 2999)
        }))
        .into_response(),
        "prod_2" => Json(json!({
            "product": product_fixture("prod_2", "Test Kit B", "variant_3", 9999)
        }))
        .into_response(),
        _ => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Product not found."),
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.email == "pending@example.com" {
        return error_response(
            StatusCode::FORBIDDEN,
            "VENDOR_NOT_APPROVED",
            "Your vendor application is pending review.",
        );
    }
    if body.email == "test@example.com" && body.password == "password" {
        return (
            [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/; HttpOnly"))],
            Json(json!({ "customer": customer_fixture("customer", None) })),
        )
            .into_response();
    }
    error_response(
        StatusCode::UNAUTHORIZED,
        "INVALID_CREDENTIALS",
        "Invalid email or password.",
    )
}

async fn current_customer(headers: HeaderMap) -> Response {
    if has_session(&headers) {
        Json(json!({ "customer": customer_fixture("customer", None) })).into_response()
    } else {
        error_response(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Not signed in.")
    }
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
}

async fn register_customer(Json(body): Json<RegisterBody>) -> Response {
    if body.email == "exists@example.com" {
        return error_response(
            StatusCode::CONFLICT,
            "EMAIL_ALREADY_EXISTS",
            "An account with this email already exists.",
        );
    }
    let mut customer = customer_fixture("customer", None);
    customer["email"] = json!(body.email);
    (StatusCode::CREATED, Json(json!({ "customer": customer }))).into_response()
}

async fn register_vendor(Json(body): Json<RegisterBody>) -> Response {
    let mut customer = customer_fixture("vendor", Some("pending"));
    customer["email"] = json!(body.email);
    (StatusCode::CREATED, Json(json!({ "customer": customer }))).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if has_session(&headers) {
        Json(json!({ "customer": customer_fixture("customer", None) })).into_response()
    } else {
        error_response(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Not signed in.")
    }
}

// =============================================================================
// Carts
// =============================================================================

fn cart_response(id: &str, items: &[MockItem]) -> Value {
    let subtotal: i64 = items
        .iter()
        .map(|i| i.unit_price * i64::from(i.quantity))
        .sum();
    json!({
        "cart": {
            "id": id,
            "items": items.iter().map(|i| json!({
                "id": i.id,
                "variant_id": i.variant_id,
                "title": i.title,
                "quantity": i.quantity,
                "unit_price": i.unit_price,
            })).collect::<Vec<_>>(),
            "subtotal": subtotal,
            "shipping_total": 0,
            "tax_total": 0,
            "total": subtotal,
        }
    })
}

async fn create_cart(State(state): State<Arc<MockState>>) -> Response {
    let n = state.next_cart.fetch_add(1, Ordering::SeqCst);
    let id = format!("cart_{}", 123 + n);
    state
        .carts
        .lock()
        .expect("carts lock")
        .insert(id.clone(), Vec::new());
    state.ops.lock().expect("ops lock").push("create".to_string());
    (StatusCode::CREATED, Json(cart_response(&id, &[]))).into_response()
}

async fn get_cart(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let carts = state.carts.lock().expect("carts lock");
    match carts.get(&id) {
        Some(items) => Json(cart_response(&id, items)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Cart not found."),
    }
}

#[derive(Deserialize)]
struct AddItemBody {
    variant_id: String,
    quantity: u32,
}

async fn add_item(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<AddItemBody>,
) -> Response {
    let Some((_, title, cents)) = variant_catalog()
        .into_iter()
        .find(|(v, _, _)| *v == body.variant_id)
    else {
        return error_response(StatusCode::BAD_REQUEST, "INVALID_VARIANT", "Unknown variant.");
    };

    let mut carts = state.carts.lock().expect("carts lock");
    let Some(items) = carts.get_mut(&id) else {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Cart not found.");
    };

    if let Some(existing) = items.iter_mut().find(|i| i.variant_id == body.variant_id) {
        existing.quantity += body.quantity;
    } else {
        let n = state.next_item.fetch_add(1, Ordering::SeqCst);
        items.push(MockItem {
            id: format!("item_{}", n + 1),
            variant_id: body.variant_id.clone(),
            title: title.to_string(),
            quantity: body.quantity,
            unit_price: cents,
        });
    }

    state
        .ops
        .lock()
        .expect("ops lock")
        .push(format!("add:{}:{}", body.variant_id, body.quantity));
    Json(cart_response(&id, items)).into_response()
}

#[derive(Deserialize)]
struct UpdateItemBody {
    quantity: u32,
}

async fn update_item(
    State(state): State<Arc<MockState>>,
    Path((id, line_id)): Path<(String, String)>,
    Json(body): Json<UpdateItemBody>,
) -> Response {
    // Quantity zero is not a valid update; removal has its own endpoint.
    if body.quantity == 0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_QUANTITY",
            "Quantity must be at least 1.",
        );
    }

    let mut carts = state.carts.lock().expect("carts lock");
    let Some(items) = carts.get_mut(&id) else {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Cart not found.");
    };
    let Some(item) = items.iter_mut().find(|i| i.id == line_id) else {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Line item not found.");
    };
    item.quantity = body.quantity;

    state
        .ops
        .lock()
        .expect("ops lock")
        .push(format!("update:{line_id}:{}", body.quantity));
    Json(cart_response(&id, items)).into_response()
}

async fn remove_item(
    State(state): State<Arc<MockState>>,
    Path((id, line_id)): Path<(String, String)>,
) -> Response {
    let mut carts = state.carts.lock().expect("carts lock");
    let Some(items) = carts.get_mut(&id) else {
        return error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "Cart not found.");
    };
    items.retain(|i| i.id != line_id);

    state
        .ops
        .lock()
        .expect("ops lock")
        .push(format!("remove:{line_id}"));
    Json(cart_response(&id, items)).into_response()
}
