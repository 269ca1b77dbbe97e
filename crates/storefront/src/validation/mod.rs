//! Form validation.
//!
//! Every user-submitted form is checked against a declarative rule table
//! before anything touches the network. A rule table is a list of
//! ([`FieldRules`]) entries, each naming a field and the ordered checks that
//! apply to it; evaluation reports the first failing check per field so the
//! user sees one actionable message at a time.
//!
//! Backend rejections flow through the same shape: [`ValidationErrors`]
//! carries per-field messages plus an optional form-level message, whether
//! the errors came from a local rule table or from the commerce API.

mod forms;

pub use forms::{
    AddItemForm, AddressForm, CustomerRegisterForm, LoginForm, UpdateItemForm, VendorRegisterForm,
};

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use meadowlark_core::Email;

use crate::commerce::ApiError;

/// North American phone numbers, with optional country code and common
/// separator styles.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"^\+?1?[-. ]?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}$").unwrap()
});

// =============================================================================
// Errors
// =============================================================================

/// A single message attached to a named form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The outcome of a failed validation pass.
///
/// `fields` holds per-field messages; `root` holds a message that applies to
/// the form as a whole (for example a backend rejection that names no field).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
    pub root: Option<String>,
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(root) = &self.root {
            write!(f, "{root}")
        } else if let Some(first) = self.fields.first() {
            write!(f, "{}: {}", first.field, first.message)
        } else {
            write!(f, "validation failed")
        }
    }
}

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.root.is_none()
    }

    /// The message for a named field, if any check failed for it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: &str, message: &str) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Fold a backend rejection into the form-error shape.
    ///
    /// Field errors the backend reported are kept as field errors; anything
    /// else becomes the form-level message.
    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Validation {
                message, fields, ..
            } => {
                if fields.is_empty() {
                    Self {
                        fields: Vec::new(),
                        root: Some(message.clone()),
                    }
                } else {
                    Self {
                        fields: fields.clone(),
                        root: None,
                    }
                }
            }
            other => Self {
                fields: Vec::new(),
                root: Some(other.to_string()),
            },
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty after trimming.
    Required,
    /// Value must be at least this many characters.
    MinLen(usize),
    /// Value must be at most this many characters.
    MaxLen(usize),
    /// Value must be exactly this many characters.
    ExactLen(usize),
    /// Value must parse as an email address.
    EmailFormat,
    /// Value must look like a North American phone number.
    Phone,
    /// Value must parse as an absolute URL.
    Url,
    /// Value must parse as an integer of at least this size.
    MinQuantity(u32),
}

impl Rule {
    /// Whether `value` satisfies this rule. Empty values pass every rule
    /// except [`Rule::Required`]; optionality is expressed by omitting
    /// `Required` from a field's checks.
    #[must_use]
    pub fn passes(self, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return !matches!(self, Self::Required);
        }

        match self {
            Self::Required => true,
            Self::MinLen(n) => trimmed.chars().count() >= n,
            Self::MaxLen(n) => trimmed.chars().count() <= n,
            Self::ExactLen(n) => trimmed.chars().count() == n,
            Self::EmailFormat => Email::parse(trimmed).is_ok(),
            Self::Phone => PHONE_RE.is_match(trimmed),
            Self::Url => url::Url::parse(trimmed).is_ok(),
            Self::MinQuantity(n) => trimmed.parse::<u32>().is_ok_and(|q| q >= n),
        }
    }
}

/// A rule paired with the message shown when it fails.
#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub rule: Rule,
    pub message: &'static str,
}

impl Check {
    #[must_use]
    pub const fn new(rule: Rule, message: &'static str) -> Self {
        Self { rule, message }
    }
}

/// The ordered checks for one named field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub checks: &'static [Check],
}

/// Run a rule table against the form's field values, collecting the first
/// failing check per field.
pub(crate) fn evaluate<'a>(
    rules: &[FieldRules],
    values: impl Fn(&str) -> Option<&'a str>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for field_rules in rules {
        let value = values(field_rules.field).unwrap_or("");
        if let Some(check) = field_rules
            .checks
            .iter()
            .find(|check| !check.rule.passes(value))
        {
            errors.push(field_rules.field, check.message);
        }
    }

    errors
}

// Shared messages, kept identical across forms so the same mistake reads the
// same everywhere.
pub(crate) const MSG_REQUIRED: &str = "This field is required.";
pub(crate) const MSG_EMAIL: &str = "Please enter a valid email address.";
pub(crate) const MSG_PASSWORD_MIN: &str = "Password must be at least 8 characters long.";
pub(crate) const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub(crate) const MSG_PHONE: &str = "Please enter a valid phone number.";
pub(crate) const MSG_URL: &str = "Please enter a valid URL.";
pub(crate) const MSG_COUNTRY_CODE: &str = "Country code must be 2 letters.";
pub(crate) const MSG_QUANTITY_MIN: &str = "Quantity must be at least 1.";

// Length caps mirror the backend's column limits so oversized input is
// rejected before it is sent.
pub(crate) const MSG_MAX_255: &str = "Must be 255 characters or fewer.";
pub(crate) const MSG_MAX_100: &str = "Must be 100 characters or fewer.";
pub(crate) const MSG_MAX_50: &str = "Must be 50 characters or fewer.";
pub(crate) const MSG_MAX_20: &str = "Must be 20 characters or fewer.";
