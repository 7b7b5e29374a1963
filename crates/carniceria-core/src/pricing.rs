//! # Pricing Resolver
//!
//! Works out which price applies to a (product, cut?) pair and which units
//! it can be sold in.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     resolve_pricing(product, cut_id?)                   │
//! │                                                                         │
//! │  cut_id given? ──yes──► product.cut(cut_id) ──none──► CutNotFound       │
//! │       │                       │                                         │
//! │       no                      ▼                                         │
//! │       │                 cut prices ONLY (no fallback to product)        │
//! │       ▼                       │                                         │
//! │  product prices ──────────────┤                                         │
//! │                               ▼                                         │
//! │                  PriceAvailability::from_prices(kg?, unit?)             │
//! │                               │                                         │
//! │        None ──► NoPriceAvailable     KgOnly / UnitOnly / Both ──► ok    │
//! │                                                                         │
//! │  Default unit: kg when both exist, otherwise whichever exists.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, SaleUnit};

// =============================================================================
// Price Availability
// =============================================================================

/// Which prices exist for one pricing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceAvailability {
    None,
    KgOnly(Money),
    UnitOnly(Money),
    Both { per_kg: Money, per_unit: Money },
}

impl PriceAvailability {
    pub fn from_prices(per_kg: Option<Money>, per_unit: Option<Money>) -> Self {
        match (per_kg, per_unit) {
            (Some(per_kg), Some(per_unit)) => PriceAvailability::Both { per_kg, per_unit },
            (Some(per_kg), None) => PriceAvailability::KgOnly(per_kg),
            (None, Some(per_unit)) => PriceAvailability::UnitOnly(per_unit),
            (None, None) => PriceAvailability::None,
        }
    }

    /// Price for a unit, if this source has one.
    pub fn price_for(&self, unit: SaleUnit) -> Option<Money> {
        match (self, unit) {
            (PriceAvailability::KgOnly(p), SaleUnit::Kg) => Some(*p),
            (PriceAvailability::UnitOnly(p), SaleUnit::Piece) => Some(*p),
            (PriceAvailability::Both { per_kg, .. }, SaleUnit::Kg) => Some(*per_kg),
            (PriceAvailability::Both { per_unit, .. }, SaleUnit::Piece) => Some(*per_unit),
            _ => None,
        }
    }

    pub fn has(&self, unit: SaleUnit) -> bool {
        self.price_for(unit).is_some()
    }

    /// Kg when both exist, otherwise the only one.
    pub fn default_unit(&self) -> Option<SaleUnit> {
        match self {
            PriceAvailability::Both { .. } | PriceAvailability::KgOnly(_) => Some(SaleUnit::Kg),
            PriceAvailability::UnitOnly(_) => Some(SaleUnit::Piece),
            PriceAvailability::None => None,
        }
    }

    /// Units that can be sold, kg first.
    pub fn units(&self) -> Vec<SaleUnit> {
        SaleUnit::ALL
            .into_iter()
            .filter(|unit| self.has(*unit))
            .collect()
    }
}

/// Where the prices came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceSource {
    Product,
    Cut(i64),
}

impl PriceSource {
    pub fn cut_id(&self) -> Option<i64> {
        match self {
            PriceSource::Product => None,
            PriceSource::Cut(id) => Some(*id),
        }
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Resolved pricing for a (product, cut?) pair. Always has at least one price.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    product_id: i64,
    source: PriceSource,
    cut_name: Option<String>,
    availability: PriceAvailability,
    default_unit: SaleUnit,
}

impl Pricing {
    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn source(&self) -> PriceSource {
        self.source
    }

    pub fn cut_id(&self) -> Option<i64> {
        self.source.cut_id()
    }

    /// Display name of the selected cut, if any.
    pub fn cut_name(&self) -> Option<&str> {
        self.cut_name.as_deref()
    }

    pub fn availability(&self) -> PriceAvailability {
        self.availability
    }

    pub fn default_unit(&self) -> SaleUnit {
        self.default_unit
    }

    pub fn has(&self, unit: SaleUnit) -> bool {
        self.availability.has(unit)
    }

    /// Price for the requested unit.
    ///
    /// # Errors
    /// `UnitNotAvailable` when this source has no price for `unit`.
    pub fn price_for(&self, unit: SaleUnit) -> CoreResult<Money> {
        self.availability
            .price_for(unit)
            .ok_or(CoreError::UnitNotAvailable {
                product_id: self.product_id,
                cut_id: self.cut_id(),
                unit,
            })
    }

    /// `requested` if it has a price here, the default unit otherwise.
    pub fn unit_or_default(&self, requested: SaleUnit) -> SaleUnit {
        if self.has(requested) {
            requested
        } else {
            self.default_unit
        }
    }
}

/// Resolves the pricing source for a product and optional cut.
///
/// # Errors
/// - `CutNotFound` when `cut_id` does not belong to `product`
/// - `NoPriceAvailable` when the source has neither price
pub fn resolve_pricing(product: &Product, cut_id: Option<i64>) -> CoreResult<Pricing> {
    let (source, cut_name, per_kg, per_unit) = match cut_id {
        Some(id) => {
            let cut = product.cut(id).ok_or(CoreError::CutNotFound {
                product_id: product.id,
                cut_id: id,
            })?;
            (
                PriceSource::Cut(id),
                Some(cut.display_name()),
                cut.price_per_kg,
                cut.price_per_unit,
            )
        }
        None => (
            PriceSource::Product,
            None,
            product.price_per_kg,
            product.price_per_unit,
        ),
    };

    let availability = PriceAvailability::from_prices(per_kg, per_unit);
    let default_unit = availability
        .default_unit()
        .ok_or(CoreError::NoPriceAvailable {
            product_id: product.id,
            cut_id,
        })?;

    Ok(Pricing {
        product_id: product.id,
        source,
        cut_name,
        availability,
        default_unit,
    })
}

// =============================================================================
// Product Card Selection
// =============================================================================

/// The cut and unit picked on a product card before it is added to the cart.
///
/// ## Auto-switch Policy
/// ```text
/// unit = kg, select cut "Milanesa" (pz only)
///      │
///      ▼
/// unit becomes the new default: pz
/// ```
/// A failed selection leaves the previous cut and unit in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pricing: Pricing,
    unit: SaleUnit,
}

impl Selection {
    /// Starts on the product's own prices, or on its first priced cut when
    /// the product itself has none.
    pub fn new(product: &Product) -> CoreResult<Self> {
        let pricing = match resolve_pricing(product, None) {
            Ok(pricing) => pricing,
            Err(CoreError::NoPriceAvailable { .. }) => product
                .cuts
                .iter()
                .find_map(|cut| resolve_pricing(product, Some(cut.cut_id)).ok())
                .ok_or(CoreError::NoPriceAvailable {
                    product_id: product.id,
                    cut_id: None,
                })?,
            Err(e) => return Err(e),
        };
        let unit = pricing.default_unit();
        Ok(Self { pricing, unit })
    }

    pub fn cut_id(&self) -> Option<i64> {
        self.pricing.cut_id()
    }

    pub fn unit(&self) -> SaleUnit {
        self.unit
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Switches cut (or back to the product with `None`). The unit resets to
    /// the new source's default.
    pub fn select_cut(&mut self, product: &Product, cut_id: Option<i64>) -> CoreResult<()> {
        let pricing = resolve_pricing(product, cut_id)?;
        self.unit = pricing.default_unit();
        self.pricing = pricing;
        Ok(())
    }

    pub fn select_unit(&mut self, unit: SaleUnit) -> CoreResult<()> {
        self.pricing.price_for(unit)?;
        self.unit = unit;
        Ok(())
    }

    /// Price for the current unit, for display on the card.
    pub fn unit_price(&self) -> CoreResult<Money> {
        self.pricing.price_for(self.unit)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
