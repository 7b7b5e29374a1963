//! # Validation Module
//!
//! Boundary coercion and business rule checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Transport (carniceria-client)                                 │
//! │  ├── JSON shape (serde)                                                 │
//! │  └── Prices as number | numeric string | null                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── parse_price: RawPrice → Option<Money>, garbage is an error         │
//! │  └── search query rules                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing Resolver / Cart Store                                 │
//! │  └── Only ever sees strictly typed Product / Cut                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use carniceria_core::validation::{parse_price, RawPrice};
//! use carniceria_core::Money;
//!
//! let raw = RawPrice::Text("12.50".to_string());
//! assert_eq!(parse_price("pricePerKg", Some(&raw)).unwrap(), Some(Money::from_cents(1250)));
//!
//! let bad = RawPrice::Text("doce".to_string());
//! assert!(parse_price("pricePerKg", Some(&bad)).is_err());
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::MAX_UNIT_PRICE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Price Coercion
// =============================================================================

/// A price as the backend sends it: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawPrice::Number(n) if n.is_finite() => Decimal::from_f64(*n),
            RawPrice::Number(_) => None,
            RawPrice::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .ok()
                    .or_else(|| Decimal::from_scientific(s).ok())
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            RawPrice::Number(n) => n.to_string(),
            RawPrice::Text(s) => s.clone(),
        }
    }
}

impl From<Money> for RawPrice {
    fn from(money: Money) -> Self {
        RawPrice::Text(money.amount().to_string())
    }
}

/// Turns a transport price into a real amount.
///
/// - absent (or `null`, or an empty string) → `Ok(None)`
/// - numeric → `Ok(Some(money))`
/// - non-numeric, non-finite, negative or above `MAX_UNIT_PRICE` → `InvalidPrice`
///
/// Never substitutes zero: a price that feeds a sale must be real.
pub fn parse_price(field: &str, raw: Option<&RawPrice>) -> CoreResult<Option<Money>> {
    let raw = match raw {
        None => return Ok(None),
        Some(RawPrice::Text(s)) if s.trim().is_empty() => return Ok(None),
        Some(raw) => raw,
    };

    let invalid = || CoreError::InvalidPrice {
        field: field.to_string(),
        value: raw.describe(),
    };

    let amount = raw.to_decimal().ok_or_else(invalid)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid());
    }
    if amount > Decimal::from(MAX_UNIT_PRICE) {
        return Err(invalid());
    }
    Ok(Some(Money::new(amount)))
}

/// Display-only coercion: anything unreadable shows as zero.
///
/// Used for labels and the daily summary. Never feed the result into a
/// ticket; use [`parse_price`] for that.
pub fn display_amount(raw: Option<&RawPrice>) -> Money {
    raw.and_then(RawPrice::to_decimal)
        .map(Money::new)
        .unwrap_or_default()
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog search query.
///
/// Empty is fine (matches everything). Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
