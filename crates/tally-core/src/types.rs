//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  DiscountOffer  │   │      Item       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  buy N,         │   │  id (ascending) │       │
//! │  │  name (unique)  │   │  next at X% off │   │  product_id     │       │
//! │  │  unit_price     │   └─────────────────┘   └─────────────────┘       │
//! │  │  items ─────────┼──────────────────────────────► 0..n              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │ GlobalDiscount  │   │ PriceBreakdown  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (i64)      │   │  threshold      │   │  discount       │       │
//! │  │  825 = 8.25%    │   │  rate           │   │  tax, total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Constructors validate their invariants, so a `Product` or
//! `DiscountOffer` that exists is always well-formed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::{scale_decimal, Money};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Percentage
// =============================================================================

/// A rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
///
/// Signed, so that a negative tax rate handed in by a caller can be
/// represented and then rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(i64);

impl Percentage {
    /// 100%.
    pub const FULL: Percentage = Percentage(10_000);

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a decimal percentage (8.25 → 825 bps).
    ///
    /// The input must be finite and a whole number of basis points, so
    /// `-0.004` or `99.996` are rejected rather than rounded into a
    /// different rate. `field` names the value in the error.
    ///
    /// ```rust
    /// use tally_core::Percentage;
    ///
    /// assert_eq!(Percentage::try_from_percentage("Tax rate", 8.25)?.bps(), 825);
    /// assert!(Percentage::try_from_percentage("Tax rate", f64::NAN).is_err());
    /// # Ok::<(), tally_core::ValidationError>(())
    /// ```
    pub fn try_from_percentage(field: &str, pct: f64) -> ValidationResult<Self> {
        scale_decimal(pct, 100.0)
            .map(Percentage)
            .ok_or_else(|| ValidationError::Unrepresentable {
                field: field.to_string(),
                unit: "basis points".to_string(),
                value: pct.to_string(),
            })
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Percentage::zero()
    }
}

/// `825` bps renders as `8.25%`, `5000` as `50%`, `1050` as `10.5%`.
impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / 100;
        let frac = abs % 100;
        if frac == 0 {
            write!(f, "{}{}%", sign, whole)
        } else if frac % 10 == 0 {
            write!(f, "{}{}.{}%", sign, whole, frac / 10)
        } else {
            write!(f, "{}{}.{:02}%", sign, whole, frac)
        }
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Product identity, assigned by whoever seeds the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

/// Unit identity. Ascending order of `ItemId` is the stable order used by
/// deterministic allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Discount Offer
// =============================================================================

/// "Buy `required_quantity`, get the next one at `percentage` off."
///
/// Each full group of `required_quantity` units in a cart earns one unit's
/// price times `percentage` as discount.
///
/// ## Bounds
/// `0% < percentage <= 100%`. A 100% offer is a "buy N, get one free" deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountOffer {
    required_quantity: i64,
    percentage: Percentage,
}

impl DiscountOffer {
    /// Creates a validated offer.
    pub fn new(required_quantity: i64, percentage: Percentage) -> ValidationResult<Self> {
        validation::validate_required_quantity(required_quantity)?;
        validation::validate_offer_percentage(percentage)?;

        Ok(DiscountOffer {
            required_quantity,
            percentage,
        })
    }

    #[inline]
    pub fn required_quantity(&self) -> i64 {
        self.required_quantity
    }

    #[inline]
    pub fn percentage(&self) -> Percentage {
        self.percentage
    }

    /// Number of discounted units earned by `quantity` units.
    #[inline]
    pub fn eligible_groups(&self, quantity: i64) -> i64 {
        quantity / self.required_quantity
    }
}

// =============================================================================
// Product & Item
// =============================================================================

/// A single physical unit of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Item {
    id: ItemId,
    product_id: ProductId,
}

impl Item {
    pub(crate) fn new(id: ItemId, product_id: ProductId) -> Self {
        Item { id, product_id }
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }
}

/// A product available for sale, together with its units.
///
/// Units are attached by [`Catalog::insert_product`](crate::catalog::Catalog::insert_product)
/// and kept sorted by id.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Money,
    discount_offer: Option<DiscountOffer>,
    items: Vec<Item>,
}

impl Product {
    /// Creates a validated product with no units.
    ///
    /// ## Rules
    /// - name must not be blank
    /// - unit price must be positive
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        discount_offer: Option<DiscountOffer>,
    ) -> ValidationResult<Self> {
        let name = name.into();
        validation::validate_product_name(&name)?;
        validation::validate_unit_price(unit_price)?;

        Ok(Product {
            id,
            name,
            unit_price,
            discount_offer,
            items: Vec::new(),
        })
    }

    #[inline]
    pub fn id(&self) -> ProductId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    #[inline]
    pub fn discount_offer(&self) -> Option<&DiscountOffer> {
        self.discount_offer.as_ref()
    }

    /// All units of this product, allocated or not, ascending by id.
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Looks up one of this product's units by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items
            .binary_search_by_key(&id, Item::id)
            .ok()
            .map(|idx| &self.items[idx])
    }

    pub(crate) fn attach_items(&mut self, mut ids: Vec<ItemId>) {
        ids.sort_unstable();
        self.items = ids.into_iter().map(|id| Item::new(id, self.id)).collect();
    }
}

/// A borrowed unit handed out by the catalog: the unit plus its product.
///
/// The cart holds these; it never owns products or items.
#[derive(Debug, Clone, Copy)]
pub struct ItemRef<'a> {
    product: &'a Product,
    item: &'a Item,
}

impl<'a> ItemRef<'a> {
    pub(crate) fn new(product: &'a Product, item: &'a Item) -> Self {
        ItemRef { product, item }
    }

    #[inline]
    pub fn product(&self) -> &'a Product {
        self.product
    }

    #[inline]
    pub fn item(&self) -> &'a Item {
        self.item
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.item.id()
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.product.unit_price()
    }
}

// =============================================================================
// Allocation Strategy
// =============================================================================

/// How the catalog chooses which available units to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Lowest ids first. Same inputs always give the same units.
    #[default]
    Ordered,
    /// Uniform sample without replacement from the catalog's seeded RNG.
    Randomized,
}

// =============================================================================
// Pricing Inputs & Outputs
// =============================================================================

/// Store-wide discount applied once the cart, after product offers, reaches
/// `required_purchase_total`.
///
/// Threshold and rate always travel together and can only be built through
/// [`GlobalDiscount::new`], so every value is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalDiscount {
    required_purchase_total: Money,
    rate: Percentage,
}

impl GlobalDiscount {
    /// Creates a validated global discount.
    ///
    /// ## Rules
    /// - `required_purchase_total > 0`
    /// - `0% < rate < 100%`
    pub fn new(required_purchase_total: Money, rate: Percentage) -> ValidationResult<Self> {
        validation::validate_purchase_threshold(required_purchase_total)?;
        validation::validate_global_rate(rate)?;
        Ok(GlobalDiscount {
            required_purchase_total,
            rate,
        })
    }

    #[inline]
    pub fn required_purchase_total(&self) -> Money {
        self.required_purchase_total
    }

    #[inline]
    pub fn rate(&self) -> Percentage {
        self.rate
    }
}

/// Discount, tax and total of a cart, each computed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
