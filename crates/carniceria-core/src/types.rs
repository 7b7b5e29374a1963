//! # Domain Types
//!
//! Catalog and sale types used throughout the terminal.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Cut        │   │    Category     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │──►│  cut_id (i64)   │   │  id (i64)       │       │
//! │  │  name           │   │  name?          │   │  name           │       │
//! │  │  price_per_kg?  │   │  price_per_kg?  │   └─────────────────┘       │
//! │  │  price_per_unit?│   │  price_per_unit?│                              │
//! │  │  is_active      │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    SaleUnit     │   │  PaymentType    │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Kg    ("kg")   │   │  Cash           │                              │
//! │  │  Piece ("pz")   │   │  Card           │                              │
//! │  └─────────────────┘   │  Transfer       │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products arriving from the backend go through `validation::parse_price`
//! before they become a [`Product`]; nothing in here is unvalidated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Sale Unit
// =============================================================================

/// How a cart line is measured: by weight or by piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SaleUnit {
    /// Sold by weight, price per kilogram.
    #[serde(rename = "kg")]
    Kg,

    /// Sold by piece, price per unit.
    #[serde(rename = "pz", alias = "ud", alias = "unit", alias = "pieza")]
    Piece,
}

impl SaleUnit {
    /// Both units, kg first (the preferred default).
    pub const ALL: [SaleUnit; 2] = [SaleUnit::Kg, SaleUnit::Piece];

    /// Wire and display label.
    pub const fn label(&self) -> &'static str {
        match self {
            SaleUnit::Kg => "kg",
            SaleUnit::Piece => "pz",
        }
    }

    /// Whether fractional quantities make sense for this unit.
    pub const fn is_weighed(&self) -> bool {
        matches!(self, SaleUnit::Kg)
    }
}

impl fmt::Display for SaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SaleUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kilo" | "kilos" => Ok(SaleUnit::Kg),
            "pz" | "ud" | "unit" | "pieza" | "piezas" => Ok(SaleUnit::Piece),
            _ => Err(ValidationError::NotAllowed {
                field: "unit".to_string(),
                allowed: vec!["kg".to_string(), "pz".to_string()],
            }),
        }
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// Payment method chosen at finalize time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    #[default]
    Cash,
    Card,
    Transfer,
}

impl PaymentType {
    /// Wire value sent to the backend.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Card => "card",
            PaymentType::Transfer => "transfer",
        }
    }

    /// Label printed on the receipt.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentType::Cash => "Efectivo",
            PaymentType::Card => "Tarjeta",
            PaymentType::Transfer => "Transferencia",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentType::Cash),
            "card" | "tarjeta" => Ok(PaymentType::Card),
            "transfer" | "transferencia" => Ok(PaymentType::Transfer),
            _ => Err(ValidationError::NotAllowed {
                field: "paymentType".to_string(),
                allowed: vec![
                    "cash".to_string(),
                    "card".to_string(),
                    "transfer".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// Product category (Res, Cerdo, Pollo...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Cut
// =============================================================================

/// A cut of a product, with its own independent prices.
///
/// When a cut is selected its prices replace the product's entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cut {
    pub cut_id: i64,
    pub name: Option<String>,
    pub price_per_kg: Option<Money>,
    pub price_per_unit: Option<Money>,
}

impl Cut {
    pub fn new(cut_id: i64, name: impl Into<String>) -> Self {
        Self {
            cut_id,
            name: Some(name.into()),
            price_per_kg: None,
            price_per_unit: None,
        }
    }

    pub fn with_price_per_kg(mut self, price: Money) -> Self {
        self.price_per_kg = Some(price);
        self
    }

    pub fn with_price_per_unit(mut self, price: Money) -> Self {
        self.price_per_unit = Some(price);
        self
    }

    /// Name shown on cards and receipts; unnamed cuts fall back to their id.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Corte #{}", self.cut_id),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier.
    pub id: i64,

    /// Display name shown to the operator and on the receipt.
    pub name: String,

    pub description: Option<String>,

    /// Barcode (EAN-13, internal scale labels, etc.).
    pub barcode: Option<String>,

    /// Price per kilogram, when sold by weight.
    pub price_per_kg: Option<Money>,

    /// Price per piece, when sold by unit.
    pub price_per_unit: Option<Money>,

    /// Inactive products stay in the catalog but cannot be sold.
    pub is_active: bool,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub cuts: Vec<Cut>,
}

impl Product {
    /// Creates an active product with no prices, cuts or categories.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            barcode: None,
            price_per_kg: None,
            price_per_unit: None,
            is_active: true,
            categories: Vec::new(),
            cuts: Vec::new(),
        }
    }

    pub fn with_price_per_kg(mut self, price: Money) -> Self {
        self.price_per_kg = Some(price);
        self
    }

    pub fn with_price_per_unit(mut self, price: Money) -> Self {
        self.price_per_unit = Some(price);
        self
    }

    pub fn with_cut(mut self, cut: Cut) -> Self {
        self.cuts.push(cut);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Looks up one of this product's cuts.
    pub fn cut(&self, cut_id: i64) -> Option<&Cut> {
        self.cuts.iter().find(|c| c.cut_id == cut_id)
    }

    pub fn has_cuts(&self) -> bool {
        !self.cuts.is_empty()
    }

    /// Active, and priced either directly or through at least one cut.
    pub fn is_sellable(&self) -> bool {
        let own_price = self.price_per_kg.is_some() || self.price_per_unit.is_some();
        let cut_price = self
            .cuts
            .iter()
            .any(|c| c.price_per_kg.is_some() || c.price_per_unit.is_some());
        self.is_active && (own_price || cut_price)
    }

    pub fn in_category(&self, category_id: i64) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_unit_wire_labels() {
        assert_eq!(serde_json::to_string(&SaleUnit::Kg).unwrap(), "\"kg\"");
        assert_eq!(serde_json::to_string(&SaleUnit::Piece).unwrap(), "\"pz\"");

        let unit: SaleUnit = serde_json::from_str("\"ud\"").unwrap();
        assert_eq!(unit, SaleUnit::Piece);
        let unit: SaleUnit = serde_json::from_str("\"pieza\"").unwrap();
        assert_eq!(unit, SaleUnit::Piece);
    }

    #[test]
    fn test_sale_unit_parse() {
        assert_eq!("KG".parse::<SaleUnit>().unwrap(), SaleUnit::Kg);
        assert_eq!(" pz ".parse::<SaleUnit>().unwrap(), SaleUnit::Piece);
        assert!("litro".parse::<SaleUnit>().is_err());
    }

    #[test]
    fn test_payment_type() {
        assert_eq!(
            serde_json::to_string(&PaymentType::Transfer).unwrap(),
            "\"transfer\""
        );
        assert_eq!("efectivo".parse::<PaymentType>().unwrap(), PaymentType::Cash);
        assert_eq!("Card".parse::<PaymentType>().unwrap(), PaymentType::Card);
        assert_eq!(PaymentType::Card.label(), "Tarjeta");
        assert!("bitcoin".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_cut_display_name() {
        assert_eq!(Cut::new(3, "Vacío").display_name(), "Vacío");

        let unnamed = Cut {
            cut_id: 9,
            name: Some("  ".to_string()),
            price_per_kg: None,
            price_per_unit: None,
        };
        assert_eq!(unnamed.display_name(), "Corte #9");
    }

    #[test]
    fn test_product_sellable() {
        let bare = Product::new(1, "Sin precio");
        assert!(!bare.is_sellable());

        let priced = Product::new(2, "Bife").with_price_per_kg(Money::from_cents(1250));
        assert!(priced.is_sellable());
        assert!(!priced.clone().inactive().is_sellable());

        let via_cut = Product::new(3, "Pollo")
            .with_cut(Cut::new(1, "Pechuga").with_price_per_kg(Money::from_cents(900)));
        assert!(via_cut.is_sellable());
        assert!(via_cut.cut(1).is_some());
        assert!(via_cut.cut(2).is_none());
    }

    #[test]
    fn test_product_deserializes_camel_case() {
        let json = r#"{
            "id": 5,
            "name": "Costilla",
            "description": null,
            "barcode": null,
            "pricePerKg": 9.5,
            "pricePerUnit": null,
            "isActive": true,
            "cuts": [{"cutId": 1, "name": null, "pricePerKg": null, "pricePerUnit": 3}]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price_per_kg, Some(Money::from_cents(950)));
        assert!(product.categories.is_empty());
        assert_eq!(product.cuts[0].price_per_unit, Some(Money::from_cents(300)));
    }
}
