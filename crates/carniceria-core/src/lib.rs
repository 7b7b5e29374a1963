//! # carniceria-core: Pure Point-of-Sale Logic
//!
//! This crate is the **heart** of the butcher shop terminal. It holds every
//! pricing and cart rule as plain synchronous code with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Carnicería POS Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator console / rendering layer              │   │
//! │  │   Product grid ──► Cart panel ──► Payment ──► Printed ticket    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            carniceria-client (REST boundary, session)           │   │
//! │  │   catalog fetch, ticket assembler, markPrinted, daily summary   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ carniceria-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ pricing  │ │   cart   │ │  ticket  │ │ receipt  │          │   │
//! │  │   │ resolver │ │  store   │ │ requests │ │  layout  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ASYNC • DETERMINISTIC               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog types (Product, Cut, SaleUnit, PaymentType)
//! - [`money`] - `Money` and `Quantity` over exact decimals
//! - [`pricing`] - Pricing Resolver and product card selection
//! - [`cart`] - Cart Store and its invariants
//! - [`ticket`] - Ticket shapes and the create-ticket request builder
//! - [`receipt`] - Printable ticket view model and fixed-width layout
//! - [`summary`] - Daily sales summary (display only)
//! - [`catalog`] - In-memory catalog index and search
//! - [`validation`] - Boundary coercion and business rule checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use carniceria_core::{Cart, Money, PaymentType, Product, Quantity, SaleUnit};
//! use carniceria_core::ticket::CreateTicketRequest;
//!
//! let bife = Product::new(1, "Bife de Chorizo").with_price_per_kg(Money::from_cents(1250));
//!
//! let mut cart = Cart::new();
//! cart.add_item(&bife, None, Some(SaleUnit::Kg), "1.2".parse::<Quantity>().unwrap())
//!     .unwrap();
//!
//! let request = CreateTicketRequest::from_cart(&cart, PaymentType::Cash).unwrap();
//! assert_eq!(request.total, Money::from_cents(1500));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod summary;
pub mod ticket;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartState, CartTotals, CartView, QuantityUpdate};
pub use catalog::{Catalog, CategoryFilter};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Quantity};
pub use pricing::{resolve_pricing, PriceAvailability, PriceSource, Pricing, Selection};
pub use ticket::{Ticket, TicketLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single cart line (kilograms or pieces).
///
/// ## Business Reason
/// Catches a mistyped weight (e.g. `1200` instead of `1.200`) before it
/// reaches a ticket.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Highest unit price (per kg or per piece) accepted from the catalog.
///
/// Together with `MAX_LINE_QUANTITY` and `MAX_CART_ITEMS` this keeps every
/// subtotal and cart total far inside the decimal range.
pub const MAX_UNIT_PRICE: i64 = 1_000_000;
