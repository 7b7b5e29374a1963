//! # Catalog
//!
//! Read-only, in-memory index of the products fetched at startup.
//!
//! ## Search
//! ```text
//! search("bife", CategoryFilter::Only(2))
//!      │
//!      ├── category filter: product.categories contains 2
//!      └── name filter: case-insensitive "contains"
//! ```

use std::collections::HashMap;

use crate::types::{Category, Product};

/// Category tab selected above the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(i64),
}

impl CategoryFilter {
    fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => product.in_category(*id),
        }
    }
}

/// Products in backend order, with an id index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<i64, usize>,
}

impl Catalog {
    /// Builds the index. A repeated id keeps the last copy.
    pub fn new(products: Vec<Product>) -> Self {
        let mut catalog = Catalog::default();
        for product in products {
            match catalog.by_id.get(&product.id) {
                Some(&index) => catalog.products[index] = product,
                None => {
                    catalog.by_id.insert(product.id, catalog.products.len());
                    catalog.products.push(product);
                }
            }
        }
        catalog
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.by_id.get(&id).map(|&index| &self.products[index])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products whose name contains `query` (case-insensitive) within a category.
    pub fn search(&self, query: &str, category: CategoryFilter) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| category.matches(p))
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&Category> {
        let mut seen = Vec::<&Category>::new();
        for category in self.products.iter().flat_map(|p| &p.categories) {
            if !seen.iter().any(|c| c.id == category.id) {
                seen.push(category);
            }
        }
        seen
    }

    /// Products that can go in the cart right now.
    pub fn sellable(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_sellable())
    }
}
