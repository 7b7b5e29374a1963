//! # Money Module
//!
//! Provides `Money` and `Quantity`, the two numbers every sale line is made of.
//!
//! ## Why Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1.2 kg × $12.50 = 14.999999999999998  ❌ WRONG!                      │
//! │                                                                         │
//! │  Integer cents don't fit either: prices per kg may carry three         │
//! │  decimals ($8.333/kg) and weights are fractional (1.275 kg).           │
//! │                                                                         │
//! │  OUR SOLUTION: exact decimals, rounded ONCE per line                   │
//! │    8.333 × 2.5 = 20.8325 → round half up → $20.83                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use carniceria_core::money::{Money, Quantity};
//!
//! let price = Money::from_cents(1250); // $12.50 per kg
//! let weight: Quantity = "1.2".parse().unwrap();
//!
//! let subtotal = price.line_total(weight).unwrap();
//! assert_eq!(subtotal, Money::from_cents(1500));
//! assert_eq!(subtotal.to_string(), "$15.00");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of decimal places kept on every monetary result.
pub const CURRENCY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount held as an exact decimal.
///
/// ## Design Decisions
/// - **Unit prices keep their precision**: `$8.333` stays `8.333` until it
///   is multiplied by a quantity.
/// - **Line totals are rounded once**: [`Money::line_total`] rounds the
///   product half-up to cents, and the cart sums those rounded values.
/// - **Serialized as a JSON number** to match the REST backend.
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product/Cut price ──► CartItem.unit_price ──► CartItem.subtotal        │
/// │                                                  │                      │
/// │                                                  ▼                      │
/// │                         Cart.total() ──► Ticket.total ──► Receipt       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(as = "f64")]
    Decimal,
);

impl Money {
    /// Wraps a decimal amount without rounding it.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use carniceria_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "$10.99");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_DECIMALS))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to cents using standard currency rounding (half up).
    ///
    /// ## Rounding Explained
    /// ```text
    /// 20.8325 → 20.83   (third decimal < 5)
    /// 0.335   → 0.34    (exact midpoint rounds away from zero)
    /// -0.335  → -0.34
    /// ```
    pub fn round2(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Exact product of a unit price and a quantity, not rounded.
    /// `None` when the product does not fit in a decimal.
    #[inline]
    pub fn checked_times(&self, quantity: Quantity) -> Option<Money> {
        self.0.checked_mul(quantity.value()).map(Money)
    }

    /// Line subtotal: `round2(quantity × unit price)`, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use carniceria_core::money::{Money, Quantity};
    ///
    /// let price: Money = "8.333".parse().unwrap();
    /// let qty: Quantity = "2.5".parse().unwrap();
    /// assert_eq!(price.line_total(qty), Some(Money::from_cents(2083))); // 20.8325
    /// ```
    #[inline]
    pub fn line_total(&self, quantity: Quantity) -> Option<Money> {
        self.checked_times(quantity).map(|amount| amount.round2())
    }

    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
    }

    /// Sums amounts, clamping at the decimal limits instead of overflowing.
    pub fn saturating_sum<I>(amounts: I) -> Money
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .fold(Money::zero(), |total, amount| Money(total.0.saturating_add(amount.0)))
    }

    /// Formats the amount with two decimals and the given currency symbol.
    pub fn format_with(&self, symbol: &str) -> String {
        let rounded = self.round2().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{symbol}{:.2}", rounded.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.50` (always two decimals).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{trimmed}' is not a number"),
            })
    }
}

// =============================================================================
// Quantity Type
// =============================================================================

/// A strictly positive amount of product: kilograms or pieces.
///
/// Construction always goes through [`Quantity::new`] (or `FromStr`), so a
/// `Quantity` in hand is never zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Quantity(#[ts(as = "f64")] Decimal);

impl Quantity {
    /// Validates and wraps a quantity.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        Ok(Quantity(value.normalize()))
    }

    /// One unit (the default for a tap on a product card).
    #[inline]
    pub const fn one() -> Self {
        Quantity(Decimal::ONE)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Sum of two quantities (still positive). `None` on overflow.
    #[inline]
    pub fn checked_plus(&self, other: Quantity) -> Option<Quantity> {
        self.0
            .checked_add(other.0)
            .map(|sum| Quantity(sum.normalize()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::one()
    }
}

/// Display drops trailing zeros: `1.200` → `1.2`, `2.0` → `2`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().replace(',', ".");
        let value = Decimal::from_str(&trimmed).map_err(|_| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a number", s.trim()),
        })?;
        Quantity::new(value)
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

/// Serialized as a plain JSON number, like [`Money`].
impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

/// Zero and negative quantities are rejected at deserialization.
impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Quantity::new(value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
