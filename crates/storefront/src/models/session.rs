//! Session-stored state.
//!
//! The session is the only client-side state this service keeps: who is
//! signed in, which cart belongs to this visitor, and a mirrored item count
//! so the cart badge renders without a backend round trip. Everything else
//! is fetched fresh from the commerce API.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use meadowlark_core::{CartId, CustomerId, CustomerRole, VendorStatus};

use crate::commerce::{Customer, SessionToken};

/// Session keys. One value per concern; cart id and item count are stored
/// separately so the badge count survives even when the cart fetch fails.
pub const CURRENT_CUSTOMER_KEY: &str = "current_customer";
pub const BACKEND_SESSION_KEY: &str = "backend_session";
pub const CART_ID_KEY: &str = "cart_id";
pub const CART_ITEM_COUNT_KEY: &str = "cart_item_count";

/// The signed-in customer, as stored in the session.
///
/// Holds only what routing decisions and page chrome need; the full profile
/// is always refetched from the backend when a page needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub email: String,
    pub role: CustomerRole,
    pub vendor_status: Option<VendorStatus>,
}

impl CurrentCustomer {
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            email: customer.email.clone(),
            role: customer.role,
            vendor_status: customer.vendor_status,
        }
    }

    /// Whether this account may enter the vendor area.
    #[must_use]
    pub fn is_approved_vendor(&self) -> bool {
        self.role.is_vendor() && self.vendor_status == Some(VendorStatus::Approved)
    }
}

/// Load the signed-in customer from the session, if any.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn current_customer(
    session: &Session,
) -> Result<Option<CurrentCustomer>, tower_sessions::session::Error> {
    session.get(CURRENT_CUSTOMER_KEY).await
}

/// Load the captured backend session token, if any.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn backend_token(
    session: &Session,
) -> Result<Option<SessionToken>, tower_sessions::session::Error> {
    session.get(BACKEND_SESSION_KEY).await
}

/// Record a successful sign-in: the customer summary plus the backend
/// session token used to authenticate later calls.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn sign_in(
    session: &Session,
    customer: &CurrentCustomer,
    token: &SessionToken,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CURRENT_CUSTOMER_KEY, customer).await?;
    session.insert(BACKEND_SESSION_KEY, token).await
}

/// Clear authentication state while keeping the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(CURRENT_CUSTOMER_KEY)
        .await?;
    session.remove::<SessionToken>(BACKEND_SESSION_KEY).await?;
    Ok(())
}

/// Load the visitor's cart id, if one has been created.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn cart_id(session: &Session) -> Result<Option<CartId>, tower_sessions::session::Error> {
    session.get(CART_ID_KEY).await
}

/// Remember a newly created cart.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn set_cart_id(
    session: &Session,
    cart_id: &CartId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_ID_KEY, cart_id).await
}

/// Drop a stale cart reference along with its mirrored count.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn clear_cart(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CartId>(CART_ID_KEY).await?;
    session.remove::<u32>(CART_ITEM_COUNT_KEY).await?;
    Ok(())
}

/// The mirrored cart badge count. Defaults to zero when unset.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn cart_item_count(session: &Session) -> Result<u32, tower_sessions::session::Error> {
    Ok(session.get(CART_ITEM_COUNT_KEY).await?.unwrap_or(0))
}

/// Refresh the mirrored badge count after any cart mutation.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn set_cart_item_count(
    session: &Session,
    count: u32,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_ITEM_COUNT_KEY, count).await
}
