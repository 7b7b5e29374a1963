//! # Wire Types
//!
//! JSON shapes exactly as the backend sends them, and the single step that turns
//! them into validated domain types.
//!
//! ## Conversion Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payload            │ Prices            │ Bad data                      │
//! │  ───────────────────┼───────────────────┼──────────────────────────     │
//! │  RawProduct         │ parse_price       │ product skipped, warn!        │
//! │  RawTicket          │ display_amount    │ shown as 0, ticket kept       │
//! │  RawDailySummary    │ display_amount    │ shown as 0                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog prices feed sales and must be real. A ticket echo describes a sale
//! the backend already recorded, so only its id is mandatory.

use carniceria_core::summary::{DailySummary, SummaryItem};
use carniceria_core::ticket::{Cashier, Ticket, TicketLine};
use carniceria_core::validation::{display_amount, parse_price, RawPrice};
use carniceria_core::{Category, CoreResult, Cut, PaymentType, Product, SaleUnit};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

// =============================================================================
// Catalog
// =============================================================================

/// `GET /products` answers either a bare list or a paginated page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductsPayload {
    Page {
        data: Vec<RawProduct>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    List(Vec<RawProduct>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub total: u32,
    pub has_next: bool,
}

impl ProductsPayload {
    /// Every product that passes validation. Rejected rows are logged and dropped.
    pub fn into_products(self) -> Vec<Product> {
        let raw = match self {
            ProductsPayload::Page { data, pagination } => {
                if let Some(page) = pagination.filter(|p| p.has_next) {
                    warn!(
                        page = page.page,
                        total = page.total,
                        "Catalog response is paginated, only the first page was loaded"
                    );
                }
                data
            }
            ProductsPayload::List(list) => list,
        };

        raw.into_iter()
            .filter_map(|product| {
                let id = product.id;
                match product.into_product() {
                    Ok(product) => Some(product),
                    Err(e) => {
                        warn!(product_id = id, error = %e, "Skipping product with invalid data");
                        None
                    }
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub price_per_kg: Option<RawPrice>,
    #[serde(default)]
    pub price_per_unit: Option<RawPrice>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub categories: Vec<RawCategoryRef>,
    #[serde(default)]
    pub cuts: Vec<RawCut>,
}

fn default_active() -> bool {
    true
}

/// A category link: `{ categoryId, category: { id, name } }` or a plain `{ id, name }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategoryRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<RawNamed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNamed {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A product cut: `{ cutId, pricePerKg, pricePerUnit }`, name inline or nested.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCut {
    #[serde(default)]
    pub cut_id: Option<i64>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cut: Option<RawNamed>,
    #[serde(default)]
    pub price_per_kg: Option<RawPrice>,
    #[serde(default)]
    pub price_per_unit: Option<RawPrice>,
}

impl RawCategoryRef {
    fn into_category(self) -> Option<Category> {
        let id = self
            .category
            .as_ref()
            .map(|c| c.id)
            .or(self.category_id)
            .or(self.id)?;
        let name = self
            .category
            .and_then(|c| c.name)
            .or(self.name)
            .unwrap_or_else(|| format!("Categoría #{id}"));
        Some(Category { id, name })
    }
}

impl RawCut {
    fn into_cut(self, product_id: i64) -> CoreResult<Option<Cut>> {
        let Some(cut_id) = self.cut_id.or(self.id).or(self.cut.as_ref().map(|c| c.id)) else {
            warn!(product_id, "Ignoring cut without an id");
            return Ok(None);
        };
        let field = |name: &str| format!("product {product_id} cut {cut_id} {name}");
        Ok(Some(Cut {
            cut_id,
            name: self.name.or(self.cut.and_then(|c| c.name)),
            price_per_kg: parse_price(&field("pricePerKg"), self.price_per_kg.as_ref())?,
            price_per_unit: parse_price(&field("pricePerUnit"), self.price_per_unit.as_ref())?,
        }))
    }
}

impl RawProduct {
    /// Parses every price. Any garbage price rejects the whole product.
    pub fn into_product(self) -> CoreResult<Product> {
        let id = self.id;
        let field = |name: &str| format!("product {id} {name}");

        let price_per_kg = parse_price(&field("pricePerKg"), self.price_per_kg.as_ref())?;
        let price_per_unit = parse_price(&field("pricePerUnit"), self.price_per_unit.as_ref())?;

        let mut cuts = Vec::with_capacity(self.cuts.len());
        for raw in self.cuts {
            if let Some(cut) = raw.into_cut(id)? {
                cuts.push(cut);
            }
        }

        Ok(Product {
            id,
            name: self.name,
            description: self.description,
            barcode: self.barcode,
            price_per_kg,
            price_per_unit,
            is_active: self.is_active,
            categories: self
                .categories
                .into_iter()
                .filter_map(RawCategoryRef::into_category)
                .collect(),
            cuts,
        })
    }
}

// =============================================================================
// Tickets
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicket {
    pub id: i64,
    #[serde(default)]
    pub total: Option<RawPrice>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub printed: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub items: Vec<RawTicketItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicketItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub product: Option<RawNamed>,
    #[serde(default)]
    pub cut_id: Option<i64>,
    #[serde(default)]
    pub cut: Option<RawNamed>,
    #[serde(default)]
    pub quantity: Option<RawPrice>,
    #[serde(default)]
    pub unit_price: Option<RawPrice>,
    #[serde(default)]
    pub subtotal: Option<RawPrice>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl RawTicketItem {
    fn into_line(self) -> TicketLine {
        let product_id = self
            .product
            .as_ref()
            .map(|p| p.id)
            .or(self.product_id)
            .unwrap_or_default();
        let product_name = self
            .product
            .and_then(|p| p.name)
            .unwrap_or_else(|| format!("Producto #{product_id}"));
        let cut_id = self.cut.as_ref().map(|c| c.id).or(self.cut_id);
        let cut_name = match (&self.cut, cut_id) {
            (Some(RawNamed { name: Some(name), .. }), _) => Some(name.clone()),
            (_, Some(id)) => Some(format!("Corte #{id}")),
            _ => None,
        };
        let unit = self
            .unit
            .as_deref()
            .and_then(|u| u.parse::<SaleUnit>().ok())
            .unwrap_or(SaleUnit::Kg);

        TicketLine {
            id: self.id,
            product_id,
            product_name,
            cut_id,
            cut_name,
            quantity: display_amount(self.quantity.as_ref()).amount(),
            unit_price: display_amount(self.unit_price.as_ref()),
            subtotal: display_amount(self.subtotal.as_ref()),
            unit,
        }
    }
}

impl RawTicket {
    pub fn into_ticket(self) -> Ticket {
        let payment_type = match self.payment_type.as_deref().map(str::parse::<PaymentType>) {
            Some(Ok(payment)) => payment,
            other => {
                warn!(ticket_id = self.id, payment = ?other, "Unknown payment type on ticket");
                PaymentType::default()
            }
        };

        Ticket {
            id: self.id,
            total: display_amount(self.total.as_ref()),
            payment_type,
            printed: self.printed,
            created_at: self.created_at.or(self.date).unwrap_or_else(Utc::now),
            updated_at: self.updated_at,
            user: self.user.map(|u| Cashier {
                id: u.id,
                name: u.name,
            }),
            items: self.items.into_iter().map(RawTicketItem::into_line).collect(),
        }
    }
}

// =============================================================================
// Daily Summary
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDailySummary {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_sales: Option<RawPrice>,
    #[serde(default)]
    pub total_tickets: u32,
    #[serde(default)]
    pub items: Vec<RawSummaryItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSummaryItem {
    pub product_name: String,
    #[serde(default)]
    pub cut_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<RawPrice>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub total_amount: Option<RawPrice>,
}

impl RawDailySummary {
    /// `fallback_date` is used when the backend omits or garbles the date.
    pub fn into_summary(self, fallback_date: NaiveDate) -> DailySummary {
        let date = self
            .date
            .as_deref()
            .and_then(|d| d.get(..10))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or(fallback_date);

        DailySummary {
            date,
            total_sales: display_amount(self.total_sales.as_ref()),
            total_tickets: self.total_tickets,
            items: self
                .items
                .into_iter()
                .map(|item| SummaryItem {
                    product_name: item.product_name,
                    cut_name: item.cut_name,
                    quantity: display_amount(item.quantity.as_ref()).amount(),
                    unit: item.unit.unwrap_or_else(|| SaleUnit::Kg.label().to_string()),
                    total_amount: display_amount(item.total_amount.as_ref()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carniceria_core::Money;
    use serde_json::json;

    #[test]
    fn test_paginated_catalog_with_string_prices() {
        let payload: ProductsPayload = serde_json::from_value(json!({
            "data": [{
                "id": 1,
                "name": "Vacuno",
                "pricePerKg": "10.00",
                "pricePerUnit": null,
                "isActive": true,
                "categories": [{ "categoryId": 3, "category": { "id": 3, "name": "Res" } }],
                "cuts": [
                    { "cutId": 10, "name": "Vacío", "pricePerKg": "12.50", "pricePerUnit": null },
                    { "cutId": 11, "pricePerUnit": 2.75 }
                ]
            }],
            "pagination": { "page": 1, "limit": 50, "total": 1, "totalPages": 1, "hasNext": false, "hasPrev": false }
        }))
        .unwrap();

        let products = payload.into_products();
        assert_eq!(products.len(), 1);

        let vacuno = &products[0];
        assert_eq!(vacuno.price_per_kg, Some(Money::from_cents(1000)));
        assert_eq!(vacuno.price_per_unit, None);
        assert_eq!(vacuno.categories[0].name, "Res");
        assert_eq!(vacuno.cuts[0].price_per_kg, Some(Money::from_cents(1250)));
        assert_eq!(vacuno.cuts[1].price_per_unit, Some(Money::from_cents(275)));
        assert_eq!(vacuno.cuts[1].display_name(), "Corte #11");
    }

    #[test]
    fn test_invalid_prices_drop_only_that_product() {
        let payload: ProductsPayload = serde_json::from_value(json!([
            { "id": 1, "name": "Bife", "pricePerKg": "doce" },
            { "id": 2, "name": "Chorizo", "pricePerUnit": "1.50" },
            { "id": 3, "name": "Pollo", "cuts": [{ "cutId": 1, "pricePerKg": "-4" }] }
        ]))
        .unwrap();

        let products = payload.into_products();
        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);
        assert!(products[0].is_active);
    }

    #[test]
    fn test_plain_category_shape() {
        let raw: RawProduct = serde_json::from_value(json!({
            "id": 1, "name": "Bife", "categories": [{ "id": 2, "name": "Cerdo" }, { "categoryId": 5 }]
        }))
        .unwrap();
        let product = raw.into_product().unwrap();
        assert_eq!(product.categories[0], Category { id: 2, name: "Cerdo".into() });
        assert_eq!(product.categories[1].id, 5);
    }

    #[test]
    fn test_ticket_echo() {
        let raw: RawTicket = serde_json::from_value(json!({
            "id": 42,
            "total": "15.00",
            "paymentType": "cash",
            "printed": false,
            "date": "2026-10-18T14:07:00.000Z",
            "createdAt": "2026-10-18T14:07:00.000Z",
            "updatedAt": "2026-10-18T14:07:00.000Z",
            "user": { "id": 1, "name": "Ana", "email": "ana@example.com" },
            "items": [{
                "id": 7,
                "quantity": "1.2",
                "unitPrice": "12.50",
                "subtotal": "15.00",
                "product": { "id": 1, "name": "Vacuno" },
                "cut": { "id": 10, "name": "Vacío" }
            }]
        }))
        .unwrap();

        let ticket = raw.into_ticket();
        assert_eq!(ticket.number(), "#000042");
        assert_eq!(ticket.total, Money::from_cents(1500));
        assert_eq!(ticket.user.as_ref().unwrap().name, "Ana");

        let line = &ticket.items[0];
        assert_eq!(line.display_name(), "Vacuno - Vacío");
        assert_eq!(line.quantity, "1.2".parse().unwrap());
        assert_eq!(line.unit, SaleUnit::Kg);
        assert_eq!(ticket.lines_total(), Some(ticket.total));
    }

    #[test]
    fn test_summary_date_and_garbage_amounts() {
        let raw: RawDailySummary = serde_json::from_value(json!({
            "date": "2026-10-18T00:00:00.000Z",
            "totalSales": "abc",
            "totalTickets": 3,
            "items": [{ "productName": "Chorizo", "quantity": 10, "unit": "pz", "totalAmount": "50" }]
        }))
        .unwrap();

        let fallback = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let summary = raw.into_summary(fallback);
        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(summary.total_sales, Money::zero());
        assert_eq!(summary.items[0].total_amount, Money::from_cents(5000));
    }
}
