//! # Tickets
//!
//! The immutable sale record and the requests that create and update it.
//!
//! ## Ticket Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cart (NonEmpty) ──► CreateTicketRequest::from_cart ──► POST /tickets   │
//! │                                                              │          │
//! │                                                              ▼          │
//! │                                       Ticket { id, printed: false }     │
//! │                                                              │          │
//! │                       print receipt ──► UpdateTicketRequest { printed } │
//! │                                                                         │
//! │  A ticket is never changed locally except for `printed`.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartItem};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentType, SaleUnit};

// =============================================================================
// Create Request
// =============================================================================

/// One line of a create-ticket request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketLine {
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    pub unit_price: Money,
    pub subtotal: Money,
    pub unit: SaleUnit,
}

impl CreateTicketLine {
    /// Re-checks the line arithmetic before it leaves the terminal.
    fn from_item(item: &CartItem) -> CoreResult<Self> {
        if item.unit_price().is_negative() {
            return Err(CoreError::InvalidPrice {
                field: format!("{}.unitPrice", item.id()),
                value: item.unit_price().amount().to_string(),
            });
        }
        let expected = item.unit_price().line_total(item.quantity());
        if expected != Some(item.subtotal()) {
            return Err(CoreError::InvalidPrice {
                field: format!("{}.subtotal", item.id()),
                value: item.subtotal().amount().to_string(),
            });
        }

        Ok(CreateTicketLine {
            product_id: item.product_id(),
            cut_id: item.cut_id(),
            quantity: item.quantity().value(),
            unit_price: item.unit_price(),
            subtotal: item.subtotal(),
            unit: item.unit(),
        })
    }
}

/// Body of `POST /tickets`.
///
/// The backend creates the ticket and all of its lines atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    /// Sale date; the backend stamps "now" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub total: Money,
    pub payment_type: PaymentType,
    /// Cashier; left unset by the terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub items: Vec<CreateTicketLine>,
}

impl CreateTicketRequest {
    /// Builds the request for a cart.
    ///
    /// ## Errors
    /// - `EmptyCart` when there is nothing to sell
    /// - `InvalidPrice` when a line's price is negative or its subtotal does
    ///   not match `round2(quantity × unit_price)`
    pub fn from_cart(cart: &Cart, payment_type: PaymentType) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let items = cart
            .items()
            .iter()
            .map(CreateTicketLine::from_item)
            .collect::<CoreResult<Vec<_>>>()?;

        let total = Money::checked_sum(items.iter().map(|line| line.subtotal))
            .ok_or_else(|| CoreError::AmountOutOfRange("total".to_string()))?
            .round2();

        Ok(CreateTicketRequest {
            date: None,
            total,
            payment_type,
            user_id: None,
            items,
        })
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }
}

/// Body of `PATCH /tickets/{id}` as used by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTicketRequest {
    pub printed: bool,
}

impl UpdateTicketRequest {
    pub const fn mark_printed() -> Self {
        UpdateTicketRequest { printed: true }
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// Cashier attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cashier {
    pub id: i64,
    pub name: String,
}

/// A line of a persisted ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketLine {
    pub id: Option<i64>,
    pub product_id: i64,
    pub product_name: String,
    pub cut_id: Option<i64>,
    pub cut_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(as = "f64")]
    pub quantity: Decimal,
    pub unit_price: Money,
    pub subtotal: Money,
    pub unit: SaleUnit,
}

impl TicketLine {
    /// "Vacuno - Vacío" style label.
    pub fn display_name(&self) -> String {
        match &self.cut_name {
            Some(cut) => format!("{} - {}", self.product_name, cut),
            None => self.product_name.clone(),
        }
    }
}

/// A sale record created by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub total: Money,
    pub payment_type: PaymentType,
    pub printed: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
    pub user: Option<Cashier>,
    pub items: Vec<TicketLine>,
}

impl Ticket {
    /// `#000042`
    pub fn number(&self) -> String {
        format!("#{:06}", self.id)
    }

    /// Sum of line subtotals as reported by the backend, `None` when the
    /// amounts do not fit in a decimal.
    pub fn lines_total(&self) -> Option<Money> {
        Money::checked_sum(self.items.iter().map(|line| line.subtotal))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
