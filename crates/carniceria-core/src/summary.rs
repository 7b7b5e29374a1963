//! # Daily Summary
//!
//! The backend aggregates the day's sales; this module only shapes them for
//! display and for the shareable text report.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Sales for one product (or product + cut) on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub product_name: String,
    pub cut_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(as = "f64")]
    pub quantity: Decimal,
    pub unit: String,
    pub total_amount: Money,
}

impl SummaryItem {
    pub fn display_name(&self) -> String {
        match &self.cut_name {
            Some(cut) => format!("{} - {}", self.product_name, cut),
            None => self.product_name.clone(),
        }
    }
}

/// Totals for one day as reported by `GET /tickets/summary/daily`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales: Money,
    pub total_tickets: u32,
    pub items: Vec<SummaryItem>,
}

impl DailySummary {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Share of the day's sales, one decimal. `None` when nothing was sold
    /// or the ratio does not fit in a decimal.
    pub fn share_percent(&self, item: &SummaryItem) -> Option<Decimal> {
        let total = self.total_sales.amount();
        if total.is_zero() {
            return None;
        }
        let share = item
            .total_amount
            .amount()
            .checked_div(total)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        Some(share.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Plain-text report for sharing over a messaging app.
    pub fn share_text(&self) -> String {
        let mut text = String::new();
        text.push_str("📊 *RESUMEN DE VENTAS*\n");
        text.push_str(&format!("📅 Fecha: {}\n\n", self.date.format("%d/%m/%Y")));
        text.push_str(&format!("💰 Total Vendido: *{}*\n", self.total_sales));
        text.push_str(&format!("🎫 Total Tickets: *{}*\n\n", self.total_tickets));

        if self.is_empty() {
            text.push_str("No hay ventas para esta fecha\n");
            return text;
        }

        text.push_str("📦 *DETALLE POR PRODUCTO:*\n");
        text.push_str(&"─".repeat(35));
        text.push_str("\n\n");

        for (index, item) in self.items.iter().enumerate() {
            let quantity = item
                .quantity
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            text.push_str(&format!("{}. *{}*\n", index + 1, item.display_name()));
            text.push_str(&format!("   Cantidad: {quantity:.2} {}\n", item.unit));
            text.push_str(&format!("   Total: {}", item.total_amount));
            if let Some(share) = self.share_percent(item) {
                text.push_str(&format!(" ({share:.1}%)"));
            }
            text.push_str("\n\n");
        }
        text
    }
}
