//! # Error Types
//!
//! Domain-specific error types for carniceria-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  carniceria-core errors (this file)                                    │
//! │  ├── CoreError        - Pricing / cart / ticket rule violations        │
//! │  └── ValidationError  - Malformed input (quantities, names, units)     │
//! │                                                                         │
//! │  carniceria-client errors (separate crate)                             │
//! │  ├── ClientError      - Transport, config and API failures             │
//! │  └── CheckoutError    - Finalize / print workflow failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → operator message  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! Every `CoreError` is a local rejection: the operation that produced it
//! did not touch the cart. Callers show the message and carry on.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::SaleUnit;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing, cart and ticket rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested cut does not belong to the product.
    #[error("Cut {cut_id} not found for product {product_id}")]
    CutNotFound { product_id: i64, cut_id: i64 },

    /// Neither a per-kg nor a per-piece price exists for the pricing source.
    #[error("No price available for product {product_id}{}", cut_suffix(.cut_id))]
    NoPriceAvailable {
        product_id: i64,
        cut_id: Option<i64>,
    },

    /// The pricing source has no price for the requested unit.
    ///
    /// ## When This Occurs
    /// ```text
    /// Cut "Milanesa" has only pricePerUnit
    ///      │
    ///      ▼
    /// add_item(unit = kg)
    ///      │
    ///      ▼
    /// UnitNotAvailable { unit: Kg } ── no fallback to the parent's kg price
    /// ```
    #[error("Product {product_id}{} cannot be sold by {unit}", cut_suffix(.cut_id))]
    UnitNotAvailable {
        product_id: i64,
        cut_id: Option<i64>,
        unit: SaleUnit,
    },

    /// Inactive products cannot be added to the cart.
    #[error("Product '{name}' ({product_id}) is not available for sale")]
    ProductInactive { product_id: i64, name: String },

    /// A price could not be turned into a real amount.
    #[error("Invalid price for {field}: '{value}'")]
    InvalidPrice { field: String, value: String },

    /// Finalize was requested on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// No cart line with this id.
    #[error("Cart item not found: {0}")]
    ItemNotFound(String),

    /// A line was re-priced against a different product than the one it holds.
    #[error("Cart item {item_id} does not belong to product {product_id}")]
    ProductMismatch { item_id: String, product_id: i64 },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: Decimal, max: i64 },

    /// An amount does not fit in a decimal.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn cut_suffix(cut_id: &Option<i64>) -> String {
    cut_id.map(|id| format!(" (cut {id})")).unwrap_or_default()
}

impl CoreError {
    /// Machine-readable code for the rendering layer.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::CutNotFound { .. } => "CUT_NOT_FOUND",
            CoreError::NoPriceAvailable { .. } => "NO_PRICE_AVAILABLE",
            CoreError::UnitNotAvailable { .. } => "UNIT_NOT_AVAILABLE",
            CoreError::ProductInactive { .. } => "PRODUCT_INACTIVE",
            CoreError::InvalidPrice { .. } => "INVALID_PRICE",
            CoreError::EmptyCart => "EMPTY_CART",
            CoreError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            CoreError::ProductMismatch { .. } => "PRODUCT_MISMATCH",
            CoreError::CartTooLarge { .. } => "CART_TOO_LARGE",
            CoreError::QuantityTooLarge { .. } => "QUANTITY_TOO_LARGE",
            CoreError::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator or transport input doesn't meet
/// requirements. Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnitNotAvailable {
            product_id: 7,
            cut_id: Some(3),
            unit: SaleUnit::Kg,
        };
        assert_eq!(err.to_string(), "Product 7 (cut 3) cannot be sold by kg");

        let err = CoreError::NoPriceAvailable {
            product_id: 7,
            cut_id: None,
        };
        assert_eq!(err.to_string(), "No price available for product 7");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(CoreError::EmptyCart.code(), "EMPTY_CART");
        assert_eq!(
            CoreError::CutNotFound {
                product_id: 1,
                cut_id: 2
            }
            .code(),
            "CUT_NOT_FOUND"
        );
    }
}
