//! # Catalog Seeding
//!
//! Turns a validated [`StoreConfig`] into a populated [`Catalog`].
//!
//! ```text
//! [[products]] ──► ProductConfig::to_product ──► Catalog::insert_product
//!                        │                               ▲
//!                        └── IdGenerator ── item ids ────┘
//! ```
//!
//! Product and unit ids come from one [`IdGenerator`], so ids are
//! sequential in config order and never collide.

use tracing::{debug, info};

use tally_core::{Catalog, ItemId, ProductId};

use crate::config::StoreConfig;
use crate::error::StoreResult;

/// Sequential id source for products and units.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    next_product: u64,
    next_item: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_product_id(&mut self) -> ProductId {
        self.next_product += 1;
        ProductId(self.next_product)
    }

    pub fn next_item_id(&mut self) -> ItemId {
        self.next_item += 1;
        ItemId(self.next_item)
    }

    /// Reserves `count` consecutive unit ids.
    pub fn item_ids(&mut self, count: u32) -> Vec<ItemId> {
        (0..count).map(|_| self.next_item_id()).collect()
    }
}

/// Builds a catalog from configuration.
///
/// Uses a seeded RNG when `rng_seed` is set so randomized allocation is
/// reproducible.
pub fn populate(config: &StoreConfig, ids: &mut IdGenerator) -> StoreResult<Catalog> {
    let mut catalog = match config.rng_seed {
        Some(seed) => {
            debug!(seed, "Using seeded allocation RNG");
            Catalog::with_seed(seed)
        }
        None => Catalog::new(),
    };

    for entry in &config.products {
        let product = entry.to_product(ids.next_product_id())?;
        let units = ids.item_ids(entry.number_in_store);
        let id = catalog.insert_product(product, units)?;

        info!(
            product_id = %id,
            name = %entry.name,
            units = entry.number_in_store,
            promotion = entry.promotion.is_some(),
            "Product stocked"
        );
    }

    info!(
        products = catalog.products().len(),
        units = catalog.item_count(),
        "Catalog populated"
    );
    Ok(catalog)
}
