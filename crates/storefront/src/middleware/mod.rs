pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, RequireVendor};
pub use session::create_session_layer;
