//! # POS Session
//!
//! One operator, one cart. The session owns the cart and the catalog it was
//! priced from, and drives finalize and print.
//!
//! ## Lifecycle
//! ```text
//! ┌──────────┐  add/qty/cut/unit/rm   ┌──────────┐
//! │  Idle    │ ─────────────────────► │  Idle    │
//! └────┬─────┘                        └──────────┘
//!      │ checkout(payment)
//!      ▼
//! ┌──────────┐  cart mutations → CheckoutInProgress
//! │ Pending  │  checkout again  → DuplicateSubmission
//! └────┬─────┘
//!      │ created                       │ failed
//!      ▼                               ▼
//! cart cleared, last_ticket set    cart untouched, retry allowed
//! ```

use std::sync::Arc;

use carniceria_core::receipt::{render_ticket, ReceiptSettings};
use carniceria_core::ticket::Ticket;
use carniceria_core::{
    Cart, CartItem, CartView, Catalog, CoreError, PaymentType, Product, Quantity, QuantityUpdate,
    SaleUnit,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::assembler::{PendingTicket, TicketAssembler};
use crate::error::{CheckoutError, CheckoutResult};
use crate::gateway::TicketGateway;

/// Destination for rendered receipts (printer, spool file, screen).
pub trait ReceiptSink: Send {
    fn write_receipt(&mut self, ticket: &Ticket, text: &str) -> std::io::Result<()>;
}

/// Result of a print request once the receipt is out.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintOutcome {
    /// Printed and flagged as printed on the backend.
    Printed(Ticket),
    /// Printed, but the backend flag could not be set. The sale stands.
    PrintedNotRecorded { ticket_id: i64, warning: String },
}

pub struct PosSession {
    catalog: Catalog,
    cart: Cart,
    assembler: TicketAssembler,
    receipt: ReceiptSettings,
    pending: Option<PendingTicket>,
    last_ticket: Option<Ticket>,
}

impl PosSession {
    pub fn new(catalog: Catalog, gateway: Arc<dyn TicketGateway>, receipt: ReceiptSettings) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            assembler: TicketAssembler::new(gateway),
            receipt,
            pending: None,
            last_ticket: None,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn view(&self) -> CartView {
        self.cart.view()
    }

    pub fn receipt_settings(&self) -> &ReceiptSettings {
        &self.receipt
    }

    pub fn last_ticket(&self) -> Option<&Ticket> {
        self.last_ticket.as_ref()
    }

    /// True from `checkout` until its result has been collected.
    pub fn is_checkout_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Swaps in a freshly fetched catalog. Lines already in the cart keep
    /// their prices.
    pub fn replace_catalog(&mut self, catalog: Catalog) -> CheckoutResult<()> {
        self.ensure_idle()?;
        info!(products = catalog.len(), "Catalog replaced");
        self.catalog = catalog;
        Ok(())
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    pub fn add(
        &mut self,
        product_id: i64,
        cut_id: Option<i64>,
        unit: Option<SaleUnit>,
        quantity: Quantity,
    ) -> CheckoutResult<CartItem> {
        self.ensure_idle()?;
        let product = find_product(&self.catalog, product_id)?;
        let item = self.cart.add_item(product, cut_id, unit, quantity)?.clone();
        debug!(
            item_id = item.id(),
            quantity = %item.quantity(),
            subtotal = %item.subtotal(),
            "Cart line added"
        );
        Ok(item)
    }

    pub fn update_quantity(
        &mut self,
        item_id: &str,
        quantity: Decimal,
    ) -> CheckoutResult<QuantityUpdate> {
        self.ensure_idle()?;
        let update = self.cart.update_quantity(item_id, quantity)?;
        debug!(item_id, %quantity, "Cart line quantity set");
        Ok(update)
    }

    pub fn change_cut(&mut self, item_id: &str, cut_id: Option<i64>) -> CheckoutResult<CartItem> {
        self.ensure_idle()?;
        let product = find_product(&self.catalog, self.product_id_of(item_id)?)?;
        let item = self.cart.change_cut(item_id, product, cut_id)?.clone();
        debug!(from = item_id, to = item.id(), "Cart line cut changed");
        Ok(item)
    }

    pub fn change_unit(&mut self, item_id: &str, unit: SaleUnit) -> CheckoutResult<CartItem> {
        self.ensure_idle()?;
        let product = find_product(&self.catalog, self.product_id_of(item_id)?)?;
        let item = self.cart.change_unit(item_id, product, unit)?.clone();
        debug!(from = item_id, to = item.id(), "Cart line unit changed");
        Ok(item)
    }

    pub fn remove(&mut self, item_id: &str) -> CheckoutResult<bool> {
        self.ensure_idle()?;
        let removed = self.cart.remove_item(item_id);
        debug!(item_id, removed, "Cart line removed");
        Ok(removed)
    }

    pub fn clear(&mut self) -> CheckoutResult<()> {
        self.ensure_idle()?;
        self.cart.clear();
        debug!("Cart cleared");
        Ok(())
    }

    fn ensure_idle(&self) -> CheckoutResult<()> {
        if self.pending.is_some() {
            return Err(CheckoutError::CheckoutInProgress);
        }
        Ok(())
    }

    fn product_id_of(&self, item_id: &str) -> CheckoutResult<i64> {
        self.cart
            .get(item_id)
            .map(CartItem::product_id)
            .ok_or_else(|| CheckoutError::Cart(CoreError::ItemNotFound(item_id.to_string())))
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Submits the cart as a ticket and waits for it.
    ///
    /// On success the cart is cleared. On failure it is left exactly as it
    /// was. If this future is dropped mid-flight the submission keeps going
    /// and [`resume_checkout`](Self::resume_checkout) collects it.
    pub async fn checkout(&mut self, payment_type: PaymentType) -> CheckoutResult<Ticket> {
        if self.pending.is_some() {
            return Err(CheckoutError::DuplicateSubmission);
        }
        self.pending = Some(self.assembler.submit(&self.cart, payment_type)?);
        self.resume_checkout().await
    }

    /// Waits for the submission started by `checkout`.
    pub async fn resume_checkout(&mut self) -> CheckoutResult<Ticket> {
        let pending = self.pending.as_mut().ok_or(CheckoutError::NothingPending)?;
        let result = pending.wait().await;
        self.pending = None;

        let ticket = result?;
        self.cart.clear();
        self.last_ticket = Some(ticket.clone());
        Ok(ticket)
    }

    // =========================================================================
    // Printing
    // =========================================================================

    /// Renders the last created ticket into `sink`, then flags it printed.
    pub async fn print_last(&mut self, sink: &mut dyn ReceiptSink) -> CheckoutResult<PrintOutcome> {
        let ticket = self.last_ticket.clone().ok_or(CheckoutError::NothingToPrint)?;
        self.print_ticket(&ticket, sink).await
    }

    /// Fetches any ticket by id and prints it.
    pub async fn reprint(
        &mut self,
        ticket_id: i64,
        sink: &mut dyn ReceiptSink,
    ) -> CheckoutResult<PrintOutcome> {
        let ticket = self
            .assembler
            .fetch_ticket(ticket_id)
            .await
            .map_err(CheckoutError::Backend)?;
        self.print_ticket(&ticket, sink).await
    }

    /// Renders, writes to `sink`, then calls markPrinted.
    ///
    /// A sink failure stops before markPrinted. A markPrinted failure is
    /// reported but never undoes the sale.
    pub async fn print_ticket(
        &mut self,
        ticket: &Ticket,
        sink: &mut dyn ReceiptSink,
    ) -> CheckoutResult<PrintOutcome> {
        let text = render_ticket(ticket, &self.receipt);
        sink.write_receipt(ticket, &text)
            .map_err(|e| CheckoutError::PrintFailed(e.to_string()))?;

        match self.assembler.mark_printed(ticket.id).await {
            Ok(updated) => {
                info!(ticket_id = updated.id, "Ticket printed");
                if self.last_ticket.as_ref().is_some_and(|t| t.id == updated.id) {
                    self.last_ticket = Some(updated.clone());
                }
                Ok(PrintOutcome::Printed(updated))
            }
            Err(e) => {
                warn!(ticket_id = ticket.id, error = %e, "Receipt printed but not flagged on the backend");
                Ok(PrintOutcome::PrintedNotRecorded {
                    ticket_id: ticket.id,
                    warning: e.to_string(),
                })
            }
        }
    }
}

fn find_product(catalog: &Catalog, product_id: i64) -> CheckoutResult<&Product> {
    catalog
        .get(product_id)
        .ok_or(CheckoutError::ProductNotFound(product_id))
}
