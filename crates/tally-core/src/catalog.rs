//! # Inventory Catalog
//!
//! Owns every product and unit in the store and hands out available units
//! to carts.
//!
//! ## Allocation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog::allocate("B", 3, strategy)                  │
//! │                                                                         │
//! │  validate_quantity(3) ──► find_product("B") ──► lock inventory          │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                              available pool for B: {4, 7, 9, 12, ...}   │
//! │                                                      │                  │
//! │                        ┌─────────────────────────────┴──────────┐       │
//! │                        ▼                                        ▼       │
//! │                  Ordered: lowest ids              Randomized: sample    │
//! │                  {4, 7, 9}                        without replacement   │
//! │                        │                                        │       │
//! │                        └─────────────────────────────┬──────────┘       │
//! │                                                      ▼                  │
//! │                         remove chosen ids from the pool, unlock         │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                  Vec<ItemRef> (borrowed units)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The available pools and the RNG share one `Mutex`, so the "enough
//! units?" decision and the removal are a single step. A failed allocation
//! never touches the pool.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::types::{AllocationStrategy, ItemId, ItemRef, Product, ProductId};
use crate::validation;

/// Mutable half of the catalog: which units are still available.
#[derive(Debug)]
struct Inventory {
    pools: HashMap<ProductId, BTreeSet<ItemId>>,
    rng: StdRng,
}

/// The store's products and units.
///
/// Products are immutable once inserted; only unit availability changes,
/// and it only changes through [`Catalog::allocate`] and
/// [`Catalog::allocate_with_rng`].
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    by_name: HashMap<String, usize>,
    ids: HashSet<ProductId>,
    item_owner: HashMap<ItemId, ProductId>,
    inventory: Mutex<Inventory>,
}

impl Catalog {
    /// Creates an empty catalog whose randomized allocations draw from OS
    /// entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an empty catalog with a fixed RNG seed, making randomized
    /// allocation reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Catalog {
            products: Vec::new(),
            by_name: HashMap::new(),
            ids: HashSet::new(),
            item_owner: HashMap::new(),
            inventory: Mutex::new(Inventory {
                pools: HashMap::new(),
                rng,
            }),
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Registers a product with its units, all available.
    ///
    /// ## Errors
    /// - `DuplicateProduct` if the name (or id) is already in the catalog
    /// - `DuplicateItem` if a unit id is already registered or repeated
    ///
    /// Nothing is inserted when an error is returned.
    pub fn insert_product(&mut self, mut product: Product, units: Vec<ItemId>) -> CoreResult<ProductId> {
        if self.by_name.contains_key(product.name()) || self.ids.contains(&product.id()) {
            return Err(CoreError::DuplicateProduct(product.name().to_string()));
        }

        let mut seen = HashSet::with_capacity(units.len());
        for id in &units {
            if self.item_owner.contains_key(id) || !seen.insert(*id) {
                return Err(CoreError::DuplicateItem(id.0));
            }
        }

        let inventory = self
            .inventory
            .get_mut()
            .map_err(|_| CoreError::LockPoisoned)?;
        inventory
            .pools
            .insert(product.id(), units.iter().copied().collect());

        let product_id = product.id();
        for id in &units {
            self.item_owner.insert(*id, product_id);
        }
        debug!(product = %product.name(), id = %product_id, units = units.len(), "Registering product");

        product.attach_items(units);
        let idx = self.products.len();
        self.by_name.insert(product.name().to_string(), idx);
        self.ids.insert(product_id);
        self.products.push(product);

        Ok(product_id)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Exact-name product lookup.
    pub fn find_product(&self, name: &str) -> CoreResult<&Product> {
        self.by_name
            .get(name)
            .map(|&idx| &self.products[idx])
            .ok_or_else(|| CoreError::ProductNotFound(name.to_string()))
    }

    /// All products, in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Total number of units across all products.
    pub fn item_count(&self) -> usize {
        self.item_owner.len()
    }

    /// Number of units of `name` still available.
    pub fn available_count(&self, name: &str) -> CoreResult<usize> {
        let product = self.find_product(name)?;
        let inventory = self.lock_inventory()?;
        Ok(inventory.pools.get(&product.id()).map_or(0, BTreeSet::len))
    }

    /// Whether a unit is still available. Unknown ids are not available.
    pub fn is_available(&self, item: ItemId) -> CoreResult<bool> {
        let Some(product_id) = self.item_owner.get(&item) else {
            return Ok(false);
        };
        let inventory = self.lock_inventory()?;
        Ok(inventory
            .pools
            .get(product_id)
            .is_some_and(|pool| pool.contains(&item)))
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Reserves `quantity` available units of `product_name`.
    ///
    /// ## Errors
    /// - `InvalidArgument` if `quantity <= 0`
    /// - `ProductNotFound` if no product has that name
    /// - `InsufficientStock` if fewer than `quantity` units are available
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{AllocationStrategy, Catalog, ItemId, Money, Product, ProductId};
    ///
    /// let mut catalog = Catalog::with_seed(7);
    /// let soap = Product::new(ProductId(1), "Dove Soap", Money::from_cents(3999), None)?;
    /// catalog.insert_product(soap, vec![ItemId(3), ItemId(1), ItemId(2)])?;
    ///
    /// let units = catalog.allocate("Dove Soap", 2, AllocationStrategy::Ordered)?;
    /// let ids: Vec<_> = units.iter().map(|u| u.id()).collect();
    /// assert_eq!(ids, vec![ItemId(1), ItemId(2)]);
    /// assert_eq!(catalog.available_count("Dove Soap")?, 1);
    /// # Ok::<(), tally_core::CoreError>(())
    /// ```
    pub fn allocate(
        &self,
        product_name: &str,
        quantity: i64,
        strategy: AllocationStrategy,
    ) -> CoreResult<Vec<ItemRef<'_>>> {
        validation::validate_quantity(quantity)?;
        let product = self.find_product(product_name)?;
        debug!(product = %product_name, quantity, ?strategy, "Allocating units");

        let mut inventory = self.lock_inventory()?;
        let Inventory { pools, rng } = &mut *inventory;
        let sampler: Option<&mut dyn RngCore> = match strategy {
            AllocationStrategy::Ordered => None,
            AllocationStrategy::Randomized => Some(rng as &mut dyn RngCore),
        };
        let ids = take_units(product, pools, quantity, sampler)?;
        drop(inventory);

        Ok(item_refs(product, &ids))
    }

    /// Randomized allocation drawing from a caller-supplied RNG instead of
    /// the catalog's own.
    pub fn allocate_with_rng<R: RngCore>(
        &self,
        product_name: &str,
        quantity: i64,
        rng: &mut R,
    ) -> CoreResult<Vec<ItemRef<'_>>> {
        validation::validate_quantity(quantity)?;
        let product = self.find_product(product_name)?;
        debug!(product = %product_name, quantity, "Allocating units with caller RNG");

        let mut inventory = self.lock_inventory()?;
        let ids = take_units(product, &mut inventory.pools, quantity, Some(rng as &mut dyn RngCore))?;
        drop(inventory);

        Ok(item_refs(product, &ids))
    }

    fn lock_inventory(&self) -> CoreResult<MutexGuard<'_, Inventory>> {
        self.inventory.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks `quantity` ids from the product's pool and removes them.
///
/// `sampler == None` takes the lowest ids. The pool is left untouched when
/// there are not enough units.
fn take_units(
    product: &Product,
    pools: &mut HashMap<ProductId, BTreeSet<ItemId>>,
    quantity: i64,
    sampler: Option<&mut dyn RngCore>,
) -> CoreResult<Vec<ItemId>> {
    let pool = pools.entry(product.id()).or_default();
    let requested = quantity as usize;

    if pool.len() < requested {
        return Err(CoreError::InsufficientStock {
            product: product.name().to_string(),
            available: pool.len() as i64,
            requested: quantity,
        });
    }

    let chosen: Vec<ItemId> = match sampler {
        None => pool.iter().take(requested).copied().collect(),
        Some(rng) => {
            let eligible: Vec<ItemId> = pool.iter().copied().collect();
            eligible.choose_multiple(rng, requested).copied().collect()
        }
    };

    for id in &chosen {
        pool.remove(id);
    }
    debug!(product = %product.name(), allocated = chosen.len(), remaining = pool.len(), "Units allocated");

    Ok(chosen)
}

fn item_refs<'a>(product: &'a Product, ids: &[ItemId]) -> Vec<ItemRef<'a>> {
    ids.iter()
        .filter_map(|id| product.item(*id))
        .map(|item| ItemRef::new(product, item))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
