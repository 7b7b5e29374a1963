//! # Operator Console
//!
//! Executes parsed commands against the session and formats the answers.

use std::sync::Arc;

use anyhow::Result;
use carniceria_client::{
    share_link, CatalogSource, CheckoutError, PosSession, PrintOutcome, ReceiptSink,
    SummarySource,
};
use carniceria_core::pricing::PriceAvailability;
use carniceria_core::validation::validate_search_query;
use carniceria_core::{
    CartItem, CartView, Catalog, Category, CategoryFilter, Money, PaymentType, Product,
    QuantityUpdate,
};
use tracing::info;

use crate::commands::{Command, HELP};

pub struct Console {
    session: PosSession,
    products: Arc<dyn CatalogSource>,
    summary: Arc<dyn SummarySource>,
    sink: Box<dyn ReceiptSink>,
    default_payment: PaymentType,
}

impl Console {
    pub fn new(
        session: PosSession,
        products: Arc<dyn CatalogSource>,
        summary: Arc<dyn SummarySource>,
        sink: Box<dyn ReceiptSink>,
        default_payment: PaymentType,
    ) -> Self {
        Self {
            session,
            products,
            summary,
            sink,
            default_payment,
        }
    }

    pub fn session(&self) -> &PosSession {
        &self.session
    }

    /// Runs one command and returns the text to show the operator.
    pub async fn execute(&mut self, command: Command) -> Result<String> {
        let symbol = self.session.receipt_settings().currency_symbol.clone();

        let reply = match command {
            Command::Products { query, category } => {
                let query = match query {
                    Some(query) => validate_search_query(&query)?,
                    None => String::new(),
                };
                let filter = category.map_or(CategoryFilter::All, CategoryFilter::Only);
                let found = self.session.catalog().search(&query, filter);
                render_products(&found, &symbol)
            }
            Command::Categories => render_categories(&self.session.catalog().categories()),
            Command::Reload => {
                if self.session.is_checkout_pending() {
                    return Err(CheckoutError::CheckoutInProgress.into());
                }
                let products = self.products.fetch_products().await?;
                self.session.replace_catalog(Catalog::new(products))?;
                let count = self.session.catalog().len();
                info!(products = count, "Catalog reloaded by operator");
                format!("Catálogo recargado: {count} productos")
            }
            Command::Add {
                product_id,
                cut_id,
                unit,
                quantity,
            } => {
                let item = self.session.add(product_id, cut_id, unit, quantity)?;
                format!(
                    "+ {}\n{}",
                    render_item(&item, &symbol),
                    render_total(&self.session.view(), &symbol)
                )
            }
            Command::SetQuantity { item_id, quantity } => {
                match self.session.update_quantity(&item_id, quantity)? {
                    QuantityUpdate::Updated(item) => render_item(&item, &symbol),
                    QuantityUpdate::Removed => format!("Línea {item_id} quitada"),
                }
            }
            Command::SetCut { item_id, cut_id } => {
                let item = self.session.change_cut(&item_id, cut_id)?;
                render_item(&item, &symbol)
            }
            Command::SetUnit { item_id, unit } => {
                let item = self.session.change_unit(&item_id, unit)?;
                render_item(&item, &symbol)
            }
            Command::Remove { item_id } => {
                if self.session.remove(&item_id)? {
                    format!("Línea {item_id} quitada")
                } else {
                    format!("No hay línea {item_id}")
                }
            }
            Command::ShowCart => render_cart(&self.session.view(), &symbol),
            Command::Clear => {
                self.session.clear()?;
                "Carrito vacío".to_string()
            }
            Command::Pay { payment } => {
                let payment = payment.unwrap_or(self.default_payment);
                let ticket = self.session.checkout(payment).await?;
                format!(
                    "Ticket {} creado. Total: {} ({})\nEscriba 'print' para imprimir.",
                    ticket.number(),
                    ticket.total.format_with(&symbol),
                    ticket.payment_type.label()
                )
            }
            Command::Print { ticket_id } => {
                let outcome = match ticket_id {
                    Some(id) => self.session.reprint(id, self.sink.as_mut()).await?,
                    None => self.session.print_last(self.sink.as_mut()).await?,
                };
                match outcome {
                    PrintOutcome::Printed(ticket) => format!("Ticket {} impreso", ticket.number()),
                    PrintOutcome::PrintedNotRecorded { ticket_id, warning } => format!(
                        "Ticket #{ticket_id:06} impreso, pero no quedó marcado como impreso: {warning}"
                    ),
                }
            }
            Command::Summary { date } => {
                let summary = self.summary.daily_summary(date).await?;
                format!("{}\n{}", summary.share_text(), share_link(&summary)?)
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        };
        Ok(reply)
    }
}

// =============================================================================
// Formatting
// =============================================================================

fn price_text(per_kg: Option<Money>, per_unit: Option<Money>, symbol: &str) -> String {
    let availability = PriceAvailability::from_prices(per_kg, per_unit);
    let prices: Vec<String> = availability
        .units()
        .into_iter()
        .filter_map(|unit| {
            availability
                .price_for(unit)
                .map(|price| format!("{}/{}", price.format_with(symbol), unit))
        })
        .collect();
    if prices.is_empty() {
        "sin precio".to_string()
    } else {
        prices.join("  ")
    }
}

pub fn render_products(products: &[&Product], symbol: &str) -> String {
    if products.is_empty() {
        return "Sin resultados".to_string();
    }

    let mut out = Vec::new();
    for product in products {
        let mut line = format!(
            "{:>4}  {:<28} {}",
            product.id,
            product.name,
            price_text(product.price_per_kg, product.price_per_unit, symbol)
        );
        if !product.is_active {
            line.push_str("  (inactivo)");
        }
        out.push(line);

        for cut in &product.cuts {
            out.push(format!(
                "      corte {:<4} {:<22} {}",
                cut.cut_id,
                cut.display_name(),
                price_text(cut.price_per_kg, cut.price_per_unit, symbol)
            ));
        }
    }
    out.join("\n")
}

pub fn render_categories(categories: &[&Category]) -> String {
    if categories.is_empty() {
        return "Sin categorías".to_string();
    }
    categories
        .iter()
        .map(|category| format!("{:>4}  {}", category.id, category.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_item(item: &CartItem, symbol: &str) -> String {
    format!(
        "[{}] {}  {} {} x {} = {}",
        item.id(),
        item.display_name(),
        item.quantity(),
        item.unit(),
        item.unit_price().format_with(symbol),
        item.subtotal().format_with(symbol)
    )
}

fn render_total(view: &CartView, symbol: &str) -> String {
    format!(
        "Líneas: {}  TOTAL: {}",
        view.totals.item_count,
        view.totals.total.format_with(symbol)
    )
}

pub fn render_cart(view: &CartView, symbol: &str) -> String {
    if view.items.is_empty() {
        return "Carrito vacío".to_string();
    }
    let mut out: Vec<String> = view.items.iter().map(|item| render_item(item, symbol)).collect();
    out.push(render_total(view, symbol));
    out.join("\n")
}
