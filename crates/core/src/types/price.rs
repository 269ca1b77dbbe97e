//! Type-safe price representation using decimal arithmetic.
//!
//! The commerce backend transmits monetary amounts in the smallest currency
//! unit (cents for USD). [`Price`] converts those integer amounts to a
//! fixed-scale decimal once, at the boundary, so display code never does
//! floating-point money math.

use core::fmt;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Construct from backend minor-unit amounts via [`Price::from_cents`]. The
/// decimal amount always carries a scale of 2, so `Display` renders the
/// familiar `89.97` form without extra formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from an amount in the smallest currency unit.
    ///
    /// ```
    /// use meadowlark_core::{CurrencyCode, Price};
    ///
    /// let price = Price::from_cents(8997, CurrencyCode::Usd);
    /// assert_eq!(price.display(), "$89.97");
    /// ```
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(cents, 2),
            currency_code,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub fn zero(currency_code: CurrencyCode) -> Self {
        Self::from_cents(0, currency_code)
    }

    /// Multiply a unit price by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Format for display with the currency symbol (e.g., `"$19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.currency_code.symbol(), self.amount)
    }
}

impl Add for Price {
    type Output = Self;

    /// Sum two prices. Mixed-currency carts are not representable in the
    /// backend, so the left operand's currency wins.
    fn add(self, rhs: Self) -> Self {
        Self {
            amount: self.amount + rhs.amount,
            currency_code: self.currency_code,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// ISO 4217 currency codes supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd | Self::Cad | Self::Aud => "$",
            Self::Eur => "\u{20ac}",
            Self::Gbp => "\u{a3}",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
        }
    }
}
