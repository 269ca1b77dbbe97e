//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend issues opaque, prefixed string identifiers
//! (`cus_...`, `cart_...`, `item_...`, `variant_...`, `addr_...`). Use the
//! `define_id!` macro to create type-safe wrappers that prevent accidentally
//! mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper around a backend-issued string.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use meadowlark_core::define_id;
/// define_id!(CustomerId);
/// define_id!(CartId);
///
/// let customer_id = CustomerId::new("cus_123");
/// let cart_id = CartId::new("cart_123");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = cart_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(CustomerId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CartId);
define_id!(LineItemId);
define_id!(AddressId);
