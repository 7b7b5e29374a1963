//! # Cart Store
//!
//! The authoritative in-memory cart for one operator session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Operator Action          Cart Method             Cart State Change     │
//! │  ───────────────          ───────────             ─────────────────     │
//! │                                                                         │
//! │  Tap product card ───────► add_item() ──────────► push or merge line    │
//! │                                                                         │
//! │  Type new weight ────────► update_quantity() ───► qty = n (≤ 0 removes) │
//! │                                                                         │
//! │  Pick another cut ───────► change_cut() ────────► re-price + re-key     │
//! │                                                                         │
//! │  Switch kg / pz ─────────► change_unit() ───────► re-price + re-key     │
//! │                                                                         │
//! │  Click remove ───────────► remove_item() ───────► line dropped          │
//! │                                                                         │
//! │  Cancel / ticket done ───► clear() ─────────────► Empty                 │
//! │                                                                         │
//! │  NOTE: every rejected operation leaves the cart exactly as it was.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machine
//! ```text
//!            add_item                     add_item / update / remove
//!   ┌───────┐ ──────────────► ┌──────────┐ ◄─────────┐
//!   │ Empty │                 │ NonEmpty │ ──────────┘
//!   └───────┘ ◄────────────── └──────────┘
//!          clear / last line removed
//! ```
//! Finalize is only allowed from `NonEmpty`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Quantity};
use crate::pricing::{resolve_pricing, Pricing};
use crate::types::{Product, SaleUnit};
use crate::{MAX_CART_ITEMS, MAX_LINE_QUANTITY, MAX_UNIT_PRICE};

/// Composite line key: `{productId}-{cutId}-{unit}` or `{productId}-{unit}`.
pub fn item_key(product_id: i64, cut_id: Option<i64>, unit: SaleUnit) -> String {
    match cut_id {
        Some(cut_id) => format!("{product_id}-{cut_id}-{unit}"),
        None => format!("{product_id}-{unit}"),
    }
}

fn check_line_quantity(quantity: Quantity) -> CoreResult<()> {
    if quantity.value() > Decimal::from(MAX_LINE_QUANTITY) {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity.value(),
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

fn merge_quantities(current: Quantity, added: Quantity) -> CoreResult<Quantity> {
    let merged = current
        .checked_plus(added)
        .ok_or(CoreError::QuantityTooLarge {
            requested: added.value(),
            max: MAX_LINE_QUANTITY,
        })?;
    check_line_quantity(merged)?;
    Ok(merged)
}

/// `round2(quantity × unit_price)` for a line, rejecting prices above
/// `MAX_UNIT_PRICE`.
fn line_subtotal(item_id: &str, unit_price: Money, quantity: Quantity) -> CoreResult<Money> {
    if unit_price.amount() > Decimal::from(MAX_UNIT_PRICE) {
        return Err(CoreError::InvalidPrice {
            field: format!("{item_id}.unitPrice"),
            value: unit_price.amount().to_string(),
        });
    }
    unit_price
        .line_total(quantity)
        .ok_or_else(|| CoreError::AmountOutOfRange(format!("{item_id}.subtotal")))
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of the cart.
///
/// ## Design Notes
/// - `unit_price` is frozen when the line is created and only changes through
///   [`Cart::change_cut`] or [`Cart::change_unit`].
/// - `subtotal` is always `round2(quantity × unit_price)`. Fields are private
///   so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    id: String,
    product_id: i64,
    product_name: String,
    cut_id: Option<i64>,
    cut_name: Option<String>,
    quantity: Quantity,
    unit_price: Money,
    subtotal: Money,
    unit: SaleUnit,
}

impl CartItem {
    fn new(
        product: &Product,
        pricing: &Pricing,
        unit: SaleUnit,
        quantity: Quantity,
    ) -> CoreResult<Self> {
        let unit_price = pricing.price_for(unit)?;
        let id = item_key(product.id, pricing.cut_id(), unit);
        let subtotal = line_subtotal(&id, unit_price, quantity)?;
        Ok(CartItem {
            id,
            product_id: product.id,
            product_name: product.name.clone(),
            cut_id: pricing.cut_id(),
            cut_name: pricing.cut_name().map(str::to_string),
            quantity,
            unit_price,
            subtotal,
            unit,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn cut_id(&self) -> Option<i64> {
        self.cut_id
    }

    pub fn cut_name(&self) -> Option<&str> {
        self.cut_name.as_deref()
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn unit(&self) -> SaleUnit {
        self.unit
    }

    /// "Bife de Chorizo" or "Vacuno - Vacío".
    pub fn display_name(&self) -> String {
        match &self.cut_name {
            Some(cut) => format!("{} - {}", self.product_name, cut),
            None => self.product_name.clone(),
        }
    }

    fn set_quantity(&mut self, quantity: Quantity) -> CoreResult<()> {
        self.subtotal = line_subtotal(&self.id, self.unit_price, quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    fn reprice(&mut self, pricing: &Pricing, unit: SaleUnit, unit_price: Money) -> CoreResult<()> {
        let id = item_key(self.product_id, pricing.cut_id(), unit);
        self.subtotal = line_subtotal(&id, unit_price, self.quantity)?;
        self.id = id;
        self.cut_id = pricing.cut_id();
        self.cut_name = pricing.cut_name().map(str::to_string);
        self.unit = unit;
        self.unit_price = unit_price;
        Ok(())
    }
}

// =============================================================================
// Cart Views
// =============================================================================

/// Observable cart state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum CartState {
    Empty,
    NonEmpty,
}

/// Outcome of [`Cart::update_quantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityUpdate {
    Updated(CartItem),
    /// Quantity was zero or negative; the line is gone (or never existed).
    Removed,
}

/// Summary numbers shown under the cart.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(as = "f64")]
    pub total_quantity: Decimal,
    pub total: Money,
}

/// Everything the rendering layer needs to draw the cart panel.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub state: CartState,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - No two lines share a key (same product + cut + unit merges)
/// - Every line has `quantity > 0` and `subtotal = round2(quantity × unit_price)`
/// - At most `MAX_CART_ITEMS` lines, each at most `MAX_LINE_QUANTITY`
/// - Insertion order is display order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    opened_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            opened_at: Utc::now(),
        }
    }

    /// Adds a product, or merges into the existing line with the same key.
    ///
    /// `unit = None` picks the default unit for the pricing source.
    ///
    /// ## Errors
    /// - `ProductInactive` when the product is switched off
    /// - `CutNotFound` / `NoPriceAvailable` from pricing
    /// - `UnitNotAvailable` when the unit has no price under the cut/product
    /// - `QuantityTooLarge` / `CartTooLarge` for bounds
    pub fn add_item(
        &mut self,
        product: &Product,
        cut_id: Option<i64>,
        unit: Option<SaleUnit>,
        quantity: Quantity,
    ) -> CoreResult<&CartItem> {
        if !product.is_active {
            return Err(CoreError::ProductInactive {
                product_id: product.id,
                name: product.name.clone(),
            });
        }

        let pricing = resolve_pricing(product, cut_id)?;
        let unit = unit.unwrap_or_else(|| pricing.default_unit());
        pricing.price_for(unit)?;

        let key = item_key(product.id, pricing.cut_id(), unit);
        if let Some(index) = self.position(&key) {
            let merged = merge_quantities(self.items[index].quantity, quantity)?;
            self.items[index].set_quantity(merged)?;
            return Ok(&self.items[index]);
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        check_line_quantity(quantity)?;

        self.items.push(CartItem::new(product, &pricing, unit, quantity)?);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Sets a line's quantity.
    ///
    /// Zero or negative removes the line.
    pub fn update_quantity(
        &mut self,
        item_id: &str,
        quantity: Decimal,
    ) -> CoreResult<QuantityUpdate> {
        if quantity <= Decimal::ZERO {
            self.remove_item(item_id);
            return Ok(QuantityUpdate::Removed);
        }

        let index = self
            .position(item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        let quantity = Quantity::new(quantity)?;
        check_line_quantity(quantity)?;

        let item = &mut self.items[index];
        item.set_quantity(quantity)?;
        Ok(QuantityUpdate::Updated(item.clone()))
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        match self.position(item_id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empties the cart and starts a fresh one.
    pub fn clear(&mut self) {
        self.items.clear();
        self.opened_at = Utc::now();
    }

    /// Moves a line to another cut of the same product (or back to the
    /// product's own prices with `None`).
    ///
    /// The unit is kept when the new source prices it, otherwise it switches
    /// to the new default. A key collision merges into the existing line.
    pub fn change_cut(
        &mut self,
        item_id: &str,
        product: &Product,
        cut_id: Option<i64>,
    ) -> CoreResult<&CartItem> {
        let index = self.owned_position(item_id, product)?;
        let pricing = resolve_pricing(product, cut_id)?;
        let unit = pricing.unit_or_default(self.items[index].unit);
        self.reprice_line(index, &pricing, unit)
    }

    /// Switches a line between kg and pz under its current cut.
    pub fn change_unit(
        &mut self,
        item_id: &str,
        product: &Product,
        unit: SaleUnit,
    ) -> CoreResult<&CartItem> {
        let index = self.owned_position(item_id, product)?;
        let pricing = resolve_pricing(product, self.items[index].cut_id)?;
        self.reprice_line(index, &pricing, unit)
    }

    fn reprice_line(
        &mut self,
        index: usize,
        pricing: &Pricing,
        unit: SaleUnit,
    ) -> CoreResult<&CartItem> {
        let unit_price = pricing.price_for(unit)?;
        let key = item_key(self.items[index].product_id, pricing.cut_id(), unit);

        match self.position(&key) {
            Some(other) if other != index => {
                // The surviving line keeps its own frozen price.
                let merged =
                    merge_quantities(self.items[other].quantity, self.items[index].quantity)?;
                self.items[other].set_quantity(merged)?;
                self.items.remove(index);
                let survivor = if other > index { other - 1 } else { other };
                Ok(&self.items[survivor])
            }
            _ => {
                self.items[index].reprice(pricing, unit, unit_price)?;
                Ok(&self.items[index])
            }
        }
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }

    fn owned_position(&self, item_id: &str, product: &Product) -> CoreResult<usize> {
        let index = self
            .position(item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        if self.items[index].product_id != product.id {
            return Err(CoreError::ProductMismatch {
                item_id: item_id.to_string(),
                product_id: product.id,
            });
        }
        Ok(index)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Sum of the (already rounded) line subtotals.
    ///
    /// This is round-then-sum. It can differ by a cent from rounding the sum
    /// of unrounded products, and the displayed lines always add up.
    /// Line bounds keep the sum below `MAX_CART_ITEMS × MAX_LINE_QUANTITY ×
    /// MAX_UNIT_PRICE`, so it never reaches the saturation point.
    pub fn total(&self) -> Money {
        Money::saturating_sum(self.items.iter().map(CartItem::subtotal)).round2()
    }

    pub fn total_quantity(&self) -> Decimal {
        self.items.iter().map(|item| item.quantity.value()).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    /// When the cart was created or last cleared.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.items.len(),
            total_quantity: self.total_quantity(),
            total: self.total(),
        }
    }

    pub fn view(&self) -> CartView {
        CartView {
            items: self.items.clone(),
            totals: self.totals(),
            state: self.state(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cut;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn q(s: &str) -> Quantity {
        s.parse().unwrap()
    }

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn vacuno() -> Product {
        Product::new(1, "Vacuno")
            .with_price_per_kg(money("10.00"))
            .with_price_per_unit(money("4.00"))
            .with_cut(Cut::new(10, "Milanesa").with_price_per_unit(money("2.50")))
            .with_cut(
                Cut::new(11, "Vacío")
                    .with_price_per_kg(money("14.00"))
                    .with_price_per_unit(money("20.00")),
            )
    }

    #[test]
    fn test_item_key() {
        assert_eq!(item_key(1, None, SaleUnit::Kg), "1-kg");
        assert_eq!(item_key(1, Some(10), SaleUnit::Piece), "1-10-pz");
    }

    #[test]
    fn test_add_defaults_to_kg_when_both_prices() {
        let mut cart = Cart::new();
        let item = cart.add_item(&vacuno(), None, None, Quantity::one()).unwrap();
        assert_eq!(item.unit(), SaleUnit::Kg);
        assert_eq!(item.unit_price(), money("10.00"));
        assert_eq!(cart.state(), CartState::NonEmpty);
    }

    #[test]
    fn test_add_same_key_merges() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Kg), Quantity::one())
            .unwrap();
        let item = cart
            .add_item(&product, None, Some(SaleUnit::Kg), Quantity::one())
            .unwrap();

        assert_eq!(item.quantity(), q("2"));
        assert_eq!(item.subtotal(), money("20.00"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_same_product_by_kg_and_piece_are_separate_lines() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Kg), Quantity::one())
            .unwrap();
        cart.add_item(&product, None, Some(SaleUnit::Piece), Quantity::one())
            .unwrap();
        cart.add_item(&product, Some(11), Some(SaleUnit::Kg), Quantity::one())
            .unwrap();

        let ids: Vec<&str> = cart.items().iter().map(CartItem::id).collect();
        assert_eq!(ids, vec!["1-kg", "1-pz", "1-11-kg"]);
        assert_eq!(cart.total(), money("28.00"));
    }

    #[test]
    fn test_add_rejects_unavailable_unit_and_leaves_cart() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, None, Quantity::one()).unwrap();

        let err = cart
            .add_item(&product, Some(10), Some(SaleUnit::Kg), Quantity::one())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnitNotAvailable {
                cut_id: Some(10),
                unit: SaleUnit::Kg,
                ..
            }
        ));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_rejects_inactive_product() {
        let mut cart = Cart::new();
        let err = cart
            .add_item(&vacuno().inactive(), None, None, Quantity::one())
            .unwrap_err();
        assert!(matches!(err, CoreError::ProductInactive { product_id: 1, .. }));
        assert!(cart.is_empty());
        assert_eq!(cart.state(), CartState::Empty);
    }

    #[test]
    fn test_add_rejects_unknown_cut() {
        let mut cart = Cart::new();
        let err = cart
            .add_item(&vacuno(), Some(99), None, Quantity::one())
            .unwrap_err();
        assert!(matches!(err, CoreError::CutNotFound { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_rounds_half_up() {
        let mut cart = Cart::new();
        let product = Product::new(2, "Picada").with_price_per_kg(money("8.333"));
        let id = cart
            .add_item(&product, None, None, Quantity::one())
            .unwrap()
            .id()
            .to_string();

        let update = cart.update_quantity(&id, d("2.5")).unwrap();
        let QuantityUpdate::Updated(item) = update else {
            panic!("expected an update");
        };
        assert_eq!(item.quantity(), q("2.5"));
        assert_eq!(item.subtotal(), money("20.83"));
        assert_eq!(cart.get(&id).unwrap().subtotal(), money("20.83"));
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Kg), Quantity::one())
            .unwrap();
        cart.add_item(&product, None, Some(SaleUnit::Piece), Quantity::one())
            .unwrap();

        assert_eq!(
            cart.update_quantity("1-kg", Decimal::ZERO).unwrap(),
            QuantityUpdate::Removed
        );
        assert_eq!(
            cart.update_quantity("1-pz", Decimal::NEGATIVE_ONE).unwrap(),
            QuantityUpdate::Removed
        );
        assert!(cart.is_empty());

        // Removing something already gone is not an error
        assert_eq!(
            cart.update_quantity("1-pz", Decimal::ZERO).unwrap(),
            QuantityUpdate::Removed
        );
    }

    #[test]
    fn test_update_quantity_unknown_item() {
        let mut cart = Cart::new();
        let err = cart.update_quantity("404-kg", Decimal::ONE).unwrap_err();
        assert!(matches!(err, CoreError::ItemNotFound(_)));
    }

    #[test]
    fn test_quantity_bounds_leave_line_untouched() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, None, q("998")).unwrap();

        assert!(matches!(
            cart.add_item(&product, None, None, q("2")),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(matches!(
            cart.update_quantity("1-kg", d("1000")),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        let item = cart.get("1-kg").unwrap();
        assert_eq!(item.quantity(), q("998"));
        assert_eq!(item.subtotal(), money("9980.00"));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new();
        for id in 0..MAX_CART_ITEMS as i64 {
            let product = Product::new(id, format!("P{id}")).with_price_per_unit(money("1"));
            cart.add_item(&product, None, None, Quantity::one()).unwrap();
        }

        let extra = Product::new(1000, "Extra").with_price_per_unit(money("1"));
        let err = cart.add_item(&extra, None, None, Quantity::one()).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: 100 }));

        // Merging into an existing line still works at the limit
        let first = Product::new(0, "P0").with_price_per_unit(money("1"));
        assert!(cart.add_item(&first, None, None, Quantity::one()).is_ok());
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let mut cart = Cart::new();
        cart.add_item(&vacuno(), None, None, Quantity::one()).unwrap();
        assert!(!cart.remove_item("nope"));
        assert!(cart.remove_item("1-kg"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_oversized_price_is_rejected_without_panic() {
        let mut cart = Cart::new();
        let product =
            Product::new(9, "Lomo").with_price_per_kg(Money::new(Decimal::MAX));

        let err = cart
            .add_item(&product, None, None, q("2"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPrice { ref field, .. } if field == "9-kg.unitPrice"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_huge_quantity_merge_is_rejected_without_panic() {
        let mut cart = Cart::new();
        let product = Product::new(1, "Bife").with_price_per_kg(money("12.50"));
        cart.add_item(&product, None, None, q("2")).unwrap();

        let huge = Quantity::new(Decimal::MAX).unwrap();
        let err = cart.add_item(&product, None, None, huge).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        assert_eq!(cart.items()[0].quantity(), q("2"));
        assert_eq!(cart.total(), money("25.00"));
    }

    #[test]
    fn test_total_is_round_then_sum() {
        let mut cart = Cart::new();
        for id in 1..=3 {
            let product =
                Product::new(id, format!("Item {id}")).with_price_per_unit(money("0.335"));
            cart.add_item(&product, None, None, Quantity::one()).unwrap();
        }

        // Each line shows 0.34, so the total is 1.02
        assert_eq!(cart.total(), money("1.02"));

        // Rounding the unrounded sum would give 1.01 instead
        let unrounded = Money::checked_sum(
            cart.items()
                .iter()
                .map(|item| item.unit_price().checked_times(item.quantity()).unwrap()),
        )
        .unwrap();
        assert_eq!(unrounded.round2(), money("1.01"));
    }

    #[test]
    fn test_change_cut_auto_switches_unit() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Kg), q("1.5"))
            .unwrap();

        let item = cart.change_cut("1-kg", &product, Some(10)).unwrap();
        assert_eq!(item.id(), "1-10-pz");
        assert_eq!(item.unit(), SaleUnit::Piece);
        assert_eq!(item.cut_name(), Some("Milanesa"));
        assert_eq!(item.unit_price(), money("2.50"));
        assert_eq!(item.subtotal(), money("3.75"));
    }

    #[test]
    fn test_change_cut_keeps_unit_when_available() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Piece), q("2"))
            .unwrap();

        let item = cart.change_cut("1-pz", &product, Some(11)).unwrap();
        assert_eq!(item.id(), "1-11-pz");
        assert_eq!(item.subtotal(), money("40.00"));
    }

    #[test]
    fn test_change_unit_merges_on_collision() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Piece), q("2"))
            .unwrap();
        cart.add_item(&product, None, Some(SaleUnit::Kg), q("1"))
            .unwrap();

        let item = cart.change_unit("1-kg", &product, SaleUnit::Piece).unwrap();
        assert_eq!(item.id(), "1-pz");
        assert_eq!(item.quantity(), q("3"));
        assert_eq!(item.subtotal(), money("12.00"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_change_unit_rejects_unavailable() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, Some(10), None, Quantity::one())
            .unwrap();

        let err = cart
            .change_unit("1-10-pz", &product, SaleUnit::Kg)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnitNotAvailable { .. }));
        assert!(cart.get("1-10-pz").is_some());
    }

    #[test]
    fn test_change_cut_rejects_other_product() {
        let mut cart = Cart::new();
        cart.add_item(&vacuno(), None, None, Quantity::one()).unwrap();

        let other = Product::new(2, "Cerdo").with_price_per_kg(money("7"));
        let err = cart.change_cut("1-kg", &other, None).unwrap_err();
        assert!(matches!(err, CoreError::ProductMismatch { product_id: 2, .. }));
    }

    #[test]
    fn test_clear_and_totals() {
        let mut cart = Cart::new();
        let product = vacuno();
        cart.add_item(&product, None, Some(SaleUnit::Kg), q("1.25"))
            .unwrap();
        cart.add_item(&product, None, Some(SaleUnit::Piece), q("3"))
            .unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total_quantity, d("4.25"));
        assert_eq!(totals.total, money("24.50"));

        let view = cart.view();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.state, CartState::NonEmpty);

        cart.clear();
        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_bife_de_chorizo_line() {
        let bife = Product::new(1, "Bife de Chorizo").with_price_per_kg(money("12.50"));
        let mut cart = Cart::new();
        let item = cart.add_item(&bife, None, None, q("1.2")).unwrap();

        assert_eq!(item.quantity(), q("1.2"));
        assert_eq!(item.unit_price(), money("12.50"));
        assert_eq!(item.subtotal(), money("15.00"));
        assert_eq!(cart.total(), money("15.00"));
    }
}
