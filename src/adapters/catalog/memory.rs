use dashmap::DashMap;
use uuid::Uuid;

use crate::ports::catalog::{CatalogPort, Error};

/// In-memory catalog adapter for tests and local wiring.
///
/// The real catalog is an external system of record; this adapter only
/// mirrors the one thing the engine consumes from it, the current points
/// cost per product.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    costs: DashMap<Uuid, u64>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the points cost of a product.
    ///
    /// A cost of zero makes the product unredeemable, the same as if it
    /// were absent.
    pub fn set_cost(&self, product_id: Uuid, points_cost: u64) {
        self.costs.insert(product_id, points_cost);
    }

    /// Remove a product from the catalog entirely.
    pub fn remove(&self, product_id: Uuid) {
        self.costs.remove(&product_id);
    }
}

#[async_trait::async_trait]
impl CatalogPort for MemoryCatalog {
    async fn points_cost(&self, product_id: Uuid) -> Result<u64, Error> {
        self.costs
            .get(&product_id)
            .map(|cost| *cost)
            .filter(|cost| *cost > 0)
            .ok_or(Error::ProductNotFound(product_id))
    }
}
