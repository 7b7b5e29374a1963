//! # Receipt Layout
//!
//! Turns a [`Ticket`] into a printable view model and lays it out as plain
//! text for a thermal printer.
//!
//! ## Receipt Shape (32 columns, 58 mm paper)
//! ```text
//! ┌────────────────────────────────┐
//! │           CARNICERÍA           │
//! │       Sistema de Gestión       │
//! │================================│
//! │Ticket: #000042                 │
//! │Fecha: 05/03/2026 14:07         │
//! │Pago: Efectivo                  │
//! │================================│
//! │PRODUCTO                        │
//! │CANT           PRECIO      TOTAL│
//! │--------------------------------│
//! │Bife de Chorizo                 │
//! │1.2 kg         $12.50     $15.00│
//! │================================│
//! │TOTAL:                    $15.00│
//! │================================│
//! │    ¡Gracias por su compra!     │
//! │         Vuelva pronto          │
//! └────────────────────────────────┘
//! ```
//! Building the view model is pure; writing it somewhere is the caller's job.

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::ticket::{Ticket, TicketLine};

/// Default paper width in characters.
pub const DEFAULT_WIDTH: usize = 32;

/// Narrowest layout that still fits the amount columns.
pub const MIN_WIDTH: usize = 24;

// =============================================================================
// Settings
// =============================================================================

/// Store-specific receipt settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptSettings {
    pub store_name: String,
    pub subtitle: Option<String>,
    pub footer_lines: Vec<String>,
    pub width: usize,
    pub currency_symbol: String,
    /// Offset used to print the ticket's local date.
    pub utc_offset: FixedOffset,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        Self {
            store_name: "CARNICERÍA".to_string(),
            subtitle: Some("Sistema de Gestión".to_string()),
            footer_lines: vec![
                "¡Gracias por su compra!".to_string(),
                "Vuelva pronto".to_string(),
            ],
            width: DEFAULT_WIDTH,
            currency_symbol: "$".to_string(),
            utc_offset: Utc.fix(),
        }
    }
}

// =============================================================================
// View Model
// =============================================================================

/// One receipt line: name (with cut) and the three amount columns.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PrintableLine {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
    pub subtotal: String,
}

impl PrintableLine {
    fn from_line(line: &TicketLine, symbol: &str) -> Self {
        Self {
            name: line.display_name(),
            quantity: format!("{} {}", line.quantity.normalize(), line.unit),
            unit_price: line.unit_price.format_with(symbol),
            subtotal: line.subtotal.format_with(symbol),
        }
    }
}

/// Read-only projection of a ticket, ready to draw or print.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PrintableTicket {
    pub header: Vec<String>,
    pub number: String,
    pub date: String,
    pub payment: String,
    pub cashier: Option<String>,
    pub lines: Vec<PrintableLine>,
    pub total: String,
    pub footer: Vec<String>,
    pub width: usize,
}

impl PrintableTicket {
    pub fn from_ticket(ticket: &Ticket, settings: &ReceiptSettings) -> Self {
        let symbol = settings.currency_symbol.as_str();
        let header = std::iter::once(settings.store_name.clone())
            .chain(settings.subtitle.clone())
            .collect();

        Self {
            header,
            number: ticket.number(),
            date: ticket
                .created_at
                .with_timezone(&settings.utc_offset)
                .format("%d/%m/%Y %H:%M")
                .to_string(),
            payment: ticket.payment_type.label().to_string(),
            cashier: ticket.user.as_ref().map(|user| user.name.clone()),
            lines: ticket
                .items
                .iter()
                .map(|line| PrintableLine::from_line(line, symbol))
                .collect(),
            total: ticket.total.format_with(symbol),
            footer: settings.footer_lines.clone(),
            width: settings.width.max(MIN_WIDTH),
        }
    }

    /// Lays the receipt out as fixed-width text, one `\n` per line.
    pub fn render(&self) -> String {
        self.render_lines().join("\n") + "\n"
    }

    pub fn render_lines(&self) -> Vec<String> {
        let width = self.width;
        let double = "=".repeat(width);
        let mut out = Vec::new();

        for line in &self.header {
            out.extend(wrap(line, width).iter().map(|l| center(l, width)));
        }
        out.push(double.clone());

        out.push(format!("Ticket: {}", self.number));
        out.push(format!("Fecha: {}", self.date));
        out.push(format!("Pago: {}", self.payment));
        if let Some(cashier) = &self.cashier {
            out.extend(wrap(&format!("Cajero: {cashier}"), width));
        }
        out.push(double.clone());

        out.push("PRODUCTO".to_string());
        out.extend(columns("CANT", "PRECIO", "TOTAL", width));
        out.push("-".repeat(width));
        for line in &self.lines {
            out.extend(wrap(&line.name, width));
            out.extend(columns(&line.quantity, &line.unit_price, &line.subtotal, width));
        }
        out.push(double.clone());

        out.extend(spread("TOTAL:", &self.total, width));
        out.push(double);

        for line in &self.footer {
            out.extend(wrap(line, width).iter().map(|l| center(l, width)));
        }
        out
    }
}

/// Renders a ticket straight to text.
pub fn render_ticket(ticket: &Ticket, settings: &ReceiptSettings) -> String {
    PrintableTicket::from_ticket(ticket, settings).render()
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(char_len(text)) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn right_aligned(text: &str, width: usize) -> Vec<String> {
    wrap(text, width)
        .into_iter()
        .map(|l| format!("{l:>width$}"))
        .collect()
}

/// Left text, right text, spaces in between. When both do not fit on one
/// line the right text goes below, right-aligned.
fn spread(left: &str, right: &str, width: usize) -> Vec<String> {
    let used = char_len(left) + char_len(right);
    if used < width {
        let gap = width - used;
        return vec![format!("{left}{}{right}", " ".repeat(gap))];
    }
    let mut out = wrap(left, width);
    out.extend(right_aligned(right, width));
    out
}

/// Quantity left-aligned, price and subtotal right-aligned.
///
/// Amount columns always keep a space before them. A row that does not fit
/// moves the quantity to its own line, then the two amounts share the next
/// line or, failing that, take one line each.
fn columns(quantity: &str, price: &str, subtotal: &str, width: usize) -> Vec<String> {
    let amount_width = (width - width / 3) / 2;
    let quantity_width = width - 2 * amount_width;
    if char_len(quantity) <= quantity_width
        && char_len(price) < amount_width
        && char_len(subtotal) < amount_width
    {
        return vec![format!(
            "{quantity:<quantity_width$}{price:>amount_width$}{subtotal:>amount_width$}"
        )];
    }

    let mut out = wrap(quantity, width);
    if char_len(price) + 1 + char_len(subtotal) <= width {
        out.push(format!("{:>width$}", format!("{price} {subtotal}")));
    } else {
        out.extend(right_aligned(price, width));
        out.extend(right_aligned(subtotal, width));
    }
    out
}

/// Word wrap; words longer than the width are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let current_len = char_len(&current);
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// =============================================================================
// Unit Tests
// =============================================================================
