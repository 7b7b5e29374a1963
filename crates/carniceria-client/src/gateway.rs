//! # Backend Collaborators
//!
//! The three things the terminal needs from the backend, as object-safe traits.
//! [`RestClient`](crate::http::RestClient) implements all of them; tests use
//! in-memory fakes.
//!
//! ```text
//! CatalogSource  ── GET   /products?include=categories,cuts   (read-only)
//! TicketGateway  ── POST  /tickets                            (atomic create)
//!                   PATCH /tickets/{id}                       (markPrinted)
//!                   GET   /tickets/{id}
//! SummarySource  ── GET   /tickets/summary/daily?date=
//! ```

use async_trait::async_trait;
use carniceria_core::summary::DailySummary;
use carniceria_core::ticket::{CreateTicketRequest, Ticket, UpdateTicketRequest};
use carniceria_core::Product;
use chrono::NaiveDate;
use url::Url;

use crate::error::ClientResult;

/// Read-only product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Active and inactive products with their cuts and categories.
    async fn fetch_products(&self) -> ClientResult<Vec<Product>>;
}

/// Ticket persistence.
///
/// `create_ticket` is atomic: either the whole ticket with all lines exists
/// afterwards, or nothing does.
#[async_trait]
pub trait TicketGateway: Send + Sync {
    async fn create_ticket(&self, request: &CreateTicketRequest) -> ClientResult<Ticket>;

    async fn update_ticket(
        &self,
        ticket_id: i64,
        request: &UpdateTicketRequest,
    ) -> ClientResult<Ticket>;

    async fn get_ticket(&self, ticket_id: i64) -> ClientResult<Ticket>;
}

/// Daily sales totals, display only.
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// `None` asks the backend for today.
    async fn daily_summary(&self, date: Option<NaiveDate>) -> ClientResult<DailySummary>;
}

/// `https://wa.me/?text=...` link carrying the summary report.
///
/// Spaces go out as `%20`; WhatsApp shows a form-encoded `+` literally.
pub fn share_link(summary: &DailySummary) -> ClientResult<Url> {
    let mut link = Url::parse("https://wa.me/")?;
    link.set_query(Some(&format!("text={}", encode_component(&summary.share_text()))));
    Ok(link)
}

/// Percent-encodes everything outside `A-Z a-z 0-9 - _ . *`, spaces as `%20`.
fn encode_component(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use carniceria_core::Money;

    #[test]
    fn test_share_link_is_encoded() {
        let summary = DailySummary {
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            total_sales: Money::from_cents(1500),
            total_tickets: 1,
            items: vec![],
        };

        let link = share_link(&summary).unwrap();
        assert_eq!(link.host_str(), Some("wa.me"));

        let (key, value) = link.query_pairs().next().unwrap();
        assert_eq!(key, "text");
        assert_eq!(value, summary.share_text());
        assert!(!link.as_str().contains(' '));
        assert!(!link.as_str().contains('+'));
        assert!(link
            .as_str()
            .starts_with("https://wa.me/?text=%F0%9F%93%8A%20*RESUMEN%20DE%20VENTAS*%0A"));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("Total: $15.00"), "Total%3A%20%2415.00");
        assert_eq!(encode_component("1 + 1\n"), "1%20%2B%201%0A");
        assert_eq!(encode_component("Carnicería\n"), "Carnicer%C3%ADa%0A");
    }
}
