//! Form payloads and their rule tables.
//!
//! Each form deserializes straight from the request body and exposes a
//! `validate` method that runs its rule table plus any cross-field checks.
//! Routes call `validate` before building a backend payload, so invalid
//! input never leaves the process.

use serde::Deserialize;

use super::{
    Check, FieldRules, Rule, ValidationErrors, evaluate, MSG_COUNTRY_CODE, MSG_EMAIL,
    MSG_MAX_20, MSG_MAX_50, MSG_MAX_100, MSG_MAX_255, MSG_PASSWORD_MIN, MSG_PASSWORD_MISMATCH,
    MSG_PHONE, MSG_QUANTITY_MIN, MSG_REQUIRED, MSG_URL,
};

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

const LOGIN_RULES: &[FieldRules] = &[
    FieldRules {
        field: "email",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::EmailFormat, MSG_EMAIL),
        ],
    },
    FieldRules {
        field: "password",
        checks: &[Check::new(Rule::Required, MSG_REQUIRED)],
    },
];

impl LoginForm {
    /// # Errors
    ///
    /// Returns the per-field messages for any failing checks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        evaluate(LOGIN_RULES, |field| match field {
            "email" => Some(self.email.as_str()),
            "password" => Some(self.password.as_str()),
            _ => None,
        })
        .into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

const CUSTOMER_REGISTER_RULES: &[FieldRules] = &[
    FieldRules {
        field: "email",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::EmailFormat, MSG_EMAIL),
        ],
    },
    FieldRules {
        field: "password",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MinLen(8), MSG_PASSWORD_MIN),
        ],
    },
    FieldRules {
        field: "first_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "last_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "phone",
        checks: &[
            Check::new(Rule::MaxLen(50), MSG_MAX_50),
            Check::new(Rule::Phone, MSG_PHONE),
        ],
    },
];

impl CustomerRegisterForm {
    /// # Errors
    ///
    /// Returns the per-field messages for any failing checks, including a
    /// `confirm_password` error when the two password fields differ.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = evaluate(CUSTOMER_REGISTER_RULES, |field| match field {
            "email" => Some(self.email.as_str()),
            "password" => Some(self.password.as_str()),
            "first_name" => Some(self.first_name.as_str()),
            "last_name" => Some(self.last_name.as_str()),
            "phone" => self.phone.as_deref(),
            _ => None,
        });

        if errors.field("password").is_none() && self.password != self.confirm_password {
            errors.push("confirm_password", MSG_PASSWORD_MISMATCH);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorRegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub business_address_1: String,
    pub business_city: String,
    pub business_postal_code: String,
    pub business_country_code: String,
    #[serde(default)]
    pub business_province: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

const VENDOR_REGISTER_RULES: &[FieldRules] = &[
    FieldRules {
        field: "email",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::EmailFormat, MSG_EMAIL),
        ],
    },
    FieldRules {
        field: "password",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MinLen(8), MSG_PASSWORD_MIN),
        ],
    },
    FieldRules {
        field: "first_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "last_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "business_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "business_address_1",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "business_city",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(100), MSG_MAX_100),
        ],
    },
    FieldRules {
        field: "business_postal_code",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(20), MSG_MAX_20),
        ],
    },
    FieldRules {
        field: "business_country_code",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::ExactLen(2), MSG_COUNTRY_CODE),
        ],
    },
    FieldRules {
        field: "business_province",
        checks: &[Check::new(Rule::MaxLen(100), MSG_MAX_100)],
    },
    FieldRules {
        field: "website",
        checks: &[Check::new(Rule::Url, MSG_URL)],
    },
    FieldRules {
        field: "tax_id",
        checks: &[Check::new(Rule::MaxLen(100), MSG_MAX_100)],
    },
    FieldRules {
        field: "phone",
        checks: &[
            Check::new(Rule::MaxLen(50), MSG_MAX_50),
            Check::new(Rule::Phone, MSG_PHONE),
        ],
    },
];

impl VendorRegisterForm {
    /// # Errors
    ///
    /// Returns the per-field messages for any failing checks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = evaluate(VENDOR_REGISTER_RULES, |field| match field {
            "email" => Some(self.email.as_str()),
            "password" => Some(self.password.as_str()),
            "first_name" => Some(self.first_name.as_str()),
            "last_name" => Some(self.last_name.as_str()),
            "business_name" => Some(self.business_name.as_str()),
            "business_address_1" => Some(self.business_address_1.as_str()),
            "business_city" => Some(self.business_city.as_str()),
            "business_postal_code" => Some(self.business_postal_code.as_str()),
            "business_country_code" => Some(self.business_country_code.as_str()),
            "business_province" => self.business_province.as_deref(),
            "website" => self.website.as_deref(),
            "tax_id" => self.tax_id.as_deref(),
            "phone" => self.phone.as_deref(),
            _ => None,
        });

        if errors.field("password").is_none() && self.password != self.confirm_password {
            errors.push("confirm_password", MSG_PASSWORD_MISMATCH);
        }

        errors.into_result()
    }
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddressForm {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    #[serde(default)]
    pub address_2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    pub postal_code: String,
    pub country_code: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

const ADDRESS_RULES: &[FieldRules] = &[
    FieldRules {
        field: "first_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "last_name",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "address_1",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(255), MSG_MAX_255),
        ],
    },
    FieldRules {
        field: "address_2",
        checks: &[Check::new(Rule::MaxLen(255), MSG_MAX_255)],
    },
    FieldRules {
        field: "city",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(100), MSG_MAX_100),
        ],
    },
    FieldRules {
        field: "province",
        checks: &[Check::new(Rule::MaxLen(100), MSG_MAX_100)],
    },
    FieldRules {
        field: "postal_code",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::MaxLen(20), MSG_MAX_20),
        ],
    },
    FieldRules {
        field: "country_code",
        checks: &[
            Check::new(Rule::Required, MSG_REQUIRED),
            Check::new(Rule::ExactLen(2), MSG_COUNTRY_CODE),
        ],
    },
    FieldRules {
        field: "phone",
        checks: &[
            Check::new(Rule::MaxLen(50), MSG_MAX_50),
            Check::new(Rule::Phone, MSG_PHONE),
        ],
    },
    FieldRules {
        field: "company",
        checks: &[Check::new(Rule::MaxLen(255), MSG_MAX_255)],
    },
];

impl AddressForm {
    /// # Errors
    ///
    /// Returns the per-field messages for any failing checks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        evaluate(ADDRESS_RULES, |field| match field {
            "first_name" => Some(self.first_name.as_str()),
            "last_name" => Some(self.last_name.as_str()),
            "address_1" => Some(self.address_1.as_str()),
            "address_2" => self.address_2.as_deref(),
            "city" => Some(self.city.as_str()),
            "province" => self.province.as_deref(),
            "postal_code" => Some(self.postal_code.as_str()),
            "country_code" => Some(self.country_code.as_str()),
            "phone" => self.phone.as_deref(),
            "company" => self.company.as_deref(),
            _ => None,
        })
        .into_result()
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemForm {
    pub variant_id: String,
    pub quantity: u32,
}

const ADD_ITEM_RULES: &[FieldRules] = &[
    FieldRules {
        field: "variant_id",
        checks: &[Check::new(Rule::Required, MSG_REQUIRED)],
    },
    FieldRules {
        field: "quantity",
        checks: &[Check::new(Rule::MinQuantity(1), MSG_QUANTITY_MIN)],
    },
];

impl AddItemForm {
    /// # Errors
    ///
    /// Returns a field error when the variant id is missing or the quantity
    /// is zero.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let quantity = self.quantity.to_string();
        evaluate(ADD_ITEM_RULES, |field| match field {
            "variant_id" => Some(self.variant_id.as_str()),
            "quantity" => Some(quantity.as_str()),
            _ => None,
        })
        .into_result()
    }
}

/// Quantity update for an existing line item. Zero is valid here and means
/// removal; the cart routes translate it for the backend.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateItemForm {
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_customer_form() -> CustomerRegisterForm {
        CustomerRegisterForm {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_login_form_rejects_bad_email_without_network() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("email"), Some(MSG_EMAIL));
    }

    #[test]
    fn test_customer_register_valid() {
        assert!(valid_customer_form().validate().is_ok());
    }

    #[test]
    fn test_customer_register_short_password() {
        let mut form = valid_customer_form();
        form.password = "short".to_string();
        form.confirm_password = "short".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("password"), Some(MSG_PASSWORD_MIN));
        // No mismatch error stacked on top of the length failure.
        assert!(errors.field("confirm_password").is_none());
    }

    #[test]
    fn test_customer_register_password_mismatch() {
        let mut form = valid_customer_form();
        form.confirm_password = "different123".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("confirm_password"), Some(MSG_PASSWORD_MISMATCH));
    }

    fn valid_vendor_form() -> VendorRegisterForm {
        VendorRegisterForm {
            email: "vendor@example.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
            first_name: "Vera".to_string(),
            last_name: "Vendor".to_string(),
            business_name: "Vera's Goods".to_string(),
            business_address_1: "500 Market St".to_string(),
            business_city: "Portland".to_string(),
            business_postal_code: "97201".to_string(),
            business_country_code: "us".to_string(),
            business_province: Some("OR".to_string()),
            website: None,
            tax_id: None,
            phone: None,
        }
    }

    #[test]
    fn test_vendor_register_valid() {
        assert!(valid_vendor_form().validate().is_ok());
    }

    #[test]
    fn test_vendor_register_requires_business_name() {
        let mut form = valid_vendor_form();
        form.business_name = "  ".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("business_name"), Some(MSG_REQUIRED));
    }

    #[test]
    fn test_vendor_register_optional_website_validated_when_present() {
        let mut form = valid_vendor_form();
        form.website = Some("not a url".to_string());

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("website"), Some(MSG_URL));
    }

    #[test]
    fn test_address_country_code_length() {
        let form = AddressForm {
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            address_1: "123 Main St".to_string(),
            address_2: None,
            city: "Portland".to_string(),
            province: Some("OR".to_string()),
            postal_code: "97201".to_string(),
            country_code: "usa".to_string(),
            phone: None,
            company: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("country_code"), Some(MSG_COUNTRY_CODE));
    }

    #[test]
    fn test_customer_register_caps_name_length() {
        let mut form = valid_customer_form();
        form.first_name = "x".repeat(300);

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("first_name"), Some(MSG_MAX_255));
    }

    #[test]
    fn test_vendor_register_caps_field_lengths() {
        let mut form = valid_vendor_form();
        form.business_city = "c".repeat(150);
        form.tax_id = Some("9".repeat(150));

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("business_city"), Some(MSG_MAX_100));
        assert_eq!(errors.field("tax_id"), Some(MSG_MAX_100));
    }

    #[test]
    fn test_address_caps_postal_code_length() {
        let form = AddressForm {
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            address_1: "123 Main St".to_string(),
            address_2: None,
            city: "Portland".to_string(),
            province: None,
            postal_code: "9".repeat(25),
            country_code: "us".to_string(),
            phone: None,
            company: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("postal_code"), Some(MSG_MAX_20));
    }

    #[test]
    fn test_add_item_rejects_zero_quantity() {
        let form = AddItemForm {
            variant_id: "variant_1".to_string(),
            quantity: 0,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("quantity"), Some(MSG_QUANTITY_MIN));
    }
}
