//! # Cart & Pricing Engine
//!
//! A cart is an ordered list of allocated units borrowed from the
//! [`Catalog`]. All prices are derived on demand from that list.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Pricing Pipeline                            │
//! │                                                                         │
//! │  items ──► product_list ──► marked_price = Σ unit_price × qty           │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  product discount = Σ unit_price × (qty / N) × offer%      (exact)     │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  after = marked_price − product discount                               │
//! │  after ≥ threshold?  ──yes──► + after × global%            (exact)     │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  discount = round(total discount)   ◄── the only rounding step         │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  price_before_tax = marked_price − discount                            │
//! │  tax_amount       = round(price_before_tax × tax%)                     │
//! │  total_price      = price_before_tax + tax_amount                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every figure is a whole number of cents, rounded half away from zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::{ExactAmount, Money};
use crate::types::{AllocationStrategy, GlobalDiscount, ItemRef, Percentage, PriceBreakdown, Product};
use crate::validation;

/// How many units of one product are in the cart.
#[derive(Debug, Clone, Copy)]
pub struct ProductQuantity<'a> {
    pub product: &'a Product,
    pub quantity: i64,
}

/// The shopping cart.
///
/// ## Invariants
/// - One entry per unit, in allocation order
/// - The cart never deduplicates; adding the same unit twice is the
///   caller's mistake and is priced twice
/// - Holds borrowed units only; the catalog owns products and items
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    id: String,
    items: Vec<ItemRef<'a>>,
    created_at: DateTime<Utc>,
}

impl<'a> Cart<'a> {
    /// Creates a new empty cart with a random UUID.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates a new empty cart with a caller-chosen id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Cart {
            id: id.into(),
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Units in the cart, in the order they were added.
    pub fn items(&self) -> &[ItemRef<'a>] {
        &self.items
    }

    /// Number of units in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Appends allocated units.
    pub fn add(&mut self, items: impl IntoIterator<Item = ItemRef<'a>>) {
        let before = self.items.len();
        self.items.extend(items);
        debug!(cart_id = %self.id, added = self.items.len() - before, "Items added to cart");
    }

    /// Allocates `quantity` units of `product_name` from the catalog and adds
    /// them.
    ///
    /// The cart is unchanged if the allocation fails.
    pub fn add_product_items(
        &mut self,
        catalog: &'a Catalog,
        product_name: &str,
        quantity: i64,
        strategy: AllocationStrategy,
    ) -> CoreResult<()> {
        let units = catalog.allocate(product_name, quantity, strategy)?;
        self.add(units);
        Ok(())
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    /// Units grouped by product, in the order each product first appears.
    pub fn product_list(&self) -> Vec<ProductQuantity<'a>> {
        let mut index: HashMap<_, usize> = HashMap::new();
        let mut list: Vec<ProductQuantity<'a>> = Vec::new();

        for unit in &self.items {
            let product = unit.product();
            match index.get(&product.id()) {
                Some(&pos) => list[pos].quantity += 1,
                None => {
                    index.insert(product.id(), list.len());
                    list.push(ProductQuantity {
                        product,
                        quantity: 1,
                    });
                }
            }
        }

        list
    }

    /// Total number of units (same as [`Cart::len`], as `i64`).
    pub fn total_quantity(&self) -> i64 {
        self.items.len() as i64
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Sum of unit prices before any discount. Zero for an empty cart.
    ///
    /// ## Errors
    /// `AmountOverflow` if the sum does not fit in `Money`.
    pub fn marked_price(&self) -> CoreResult<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |sum, unit| sum.checked_add(unit.unit_price()))
            .ok_or(CoreError::AmountOverflow)
    }

    /// Exact sum of per-product offer discounts.
    fn product_discount(&self) -> CoreResult<ExactAmount> {
        let mut total = ExactAmount::zero();
        for line in self.product_list() {
            let Some(offer) = line.product.discount_offer() else {
                continue;
            };
            let groups = offer.eligible_groups(line.quantity);
            total = ExactAmount::from(line.product.unit_price())
                .checked_mul_quantity(groups)
                .and_then(|discounted| discounted.checked_percent(offer.percentage()))
                .and_then(|discount| total.checked_add(discount))
                .ok_or(CoreError::AmountOverflow)?;
        }
        Ok(total)
    }

    /// Total discount: product offers plus the optional global discount,
    /// rounded to cents.
    ///
    /// ## Global Discount
    /// Applies `rate` to the price left after product offers, and only when
    /// that price is at least `required_purchase_total`. A
    /// [`GlobalDiscount`] is validated when it is built, so any value passed
    /// here has a positive threshold and a rate inside `(0%, 100%)`.
    pub fn discount(&self, global: Option<&GlobalDiscount>) -> CoreResult<Money> {
        let product_discount = self.product_discount()?;
        let mut total = product_discount;

        if let Some(global) = global {
            let after = ExactAmount::from(self.marked_price()?)
                .checked_sub(product_discount)
                .ok_or(CoreError::AmountOverflow)?;
            if after >= ExactAmount::from(global.required_purchase_total()) {
                total = after
                    .checked_percent(global.rate())
                    .and_then(|extra| total.checked_add(extra))
                    .ok_or(CoreError::AmountOverflow)?;
            }
        }

        total.round_to_cents().ok_or(CoreError::AmountOverflow)
    }

    /// Marked price minus [`Cart::discount`].
    pub fn price_before_tax(&self, global: Option<&GlobalDiscount>) -> CoreResult<Money> {
        self.marked_price()?
            .checked_sub(self.discount(global)?)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Tax on the discounted price, rounded to cents.
    ///
    /// ## Errors
    /// `InvalidArgument` if `tax_rate` is negative (checked first).
    pub fn tax_amount(&self, tax_rate: Percentage, global: Option<&GlobalDiscount>) -> CoreResult<Money> {
        validation::validate_tax_rate(tax_rate)?;
        self.price_before_tax(global)?
            .checked_percent(tax_rate)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Discounted price plus tax.
    ///
    /// ## User Workflow
    /// ```text
    /// Marked: $500.00 (5 × C)
    ///      │
    ///      ▼
    /// Discount (2 free C): $200.00
    ///      │
    ///      ▼
    /// Before tax: $300.00 ──► Tax 5%: $15.00
    ///      │
    ///      ▼
    /// total_price: $315.00 ← THIS FUNCTION
    /// ```
    pub fn total_price(&self, tax_rate: Percentage, global: Option<&GlobalDiscount>) -> CoreResult<Money> {
        let tax = self.tax_amount(tax_rate, global)?;
        self.price_before_tax(global)?
            .checked_add(tax)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Discount, tax and total in one record, each computed on its own.
    pub fn price_breakdown(
        &self,
        tax_rate: Percentage,
        global: Option<&GlobalDiscount>,
    ) -> CoreResult<PriceBreakdown> {
        Ok(PriceBreakdown {
            discount: self.discount(global)?,
            tax: self.tax_amount(tax_rate, global)?,
            total: self.total_price(tax_rate, global)?,
        })
    }
}

impl Default for Cart<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{DiscountOffer, ItemId, ProductId};

    /// A 29.99 ×30, B 199.99 ×20 (buy 3, next 50% off), C 100.00 ×10 (buy 2, next free).
    fn store() -> Catalog {
        let mut catalog = Catalog::with_seed(1);
        let mut next_item = 0;
        for (idx, (name, cents, units, offer)) in [
            ("A", 2999, 30, None),
            ("B", 19999, 20, Some((3, 5000))),
            ("C", 10000, 10, Some((2, 10_000))),
        ]
        .into_iter()
        .enumerate()
        {
            let offer = offer.map(|(n, bps)| DiscountOffer::new(n, Percentage::from_bps(bps)).unwrap());
            let product =
                Product::new(ProductId(idx as u64), name, Money::from_cents(cents), offer).unwrap();
            let ids: Vec<ItemId> = (next_item..next_item + units).map(ItemId).collect();
            next_item += units;
            catalog.insert_product(product, ids).unwrap();
        }
        catalog
    }

    fn fill<'a>(cart: &mut Cart<'a>, catalog: &'a Catalog, lines: &[(&str, i64)]) {
        for (name, qty) in lines {
            cart.add_product_items(catalog, name, *qty, AllocationStrategy::Ordered)
                .unwrap();
        }
    }

    fn global(threshold_cents: i64, rate_bps: i64) -> GlobalDiscount {
        GlobalDiscount::new(Money::from_cents(threshold_cents), Percentage::from_bps(rate_bps)).unwrap()
    }

    fn pct(value: f64) -> Percentage {
        Percentage::try_from_percentage("Rate", value).unwrap()
    }

    #[test]
    fn test_add_product_items() {
        let catalog = store();
        let mut cart = Cart::new();
        assert!(cart.is_empty());

        cart.add_product_items(&catalog, "A", 3, AllocationStrategy::Ordered)
            .unwrap();
        assert_eq!(cart.len(), 3);

        cart.add_product_items(&catalog, "C", 2, AllocationStrategy::Randomized)
            .unwrap();
        assert_eq!(cart.len(), 5);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_failed_allocation_leaves_cart_unchanged() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("C", 3)]);

        let err = cart
            .add_product_items(&catalog, "C", 8, AllocationStrategy::Ordered)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 7, requested: 8, .. }
        ));
        assert_eq!(cart.len(), 3);
        assert_eq!(catalog.available_count("C").unwrap(), 7);
    }

    #[test]
    fn test_add_does_not_deduplicate() {
        let catalog = store();
        let units = catalog.allocate("A", 1, AllocationStrategy::Ordered).unwrap();
        let mut cart = Cart::new();
        cart.add(units.clone());
        cart.add(units);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.marked_price().unwrap().cents(), 5998);
    }

    #[test]
    fn test_product_list() {
        let catalog = store();
        let mut cart = Cart::new();
        assert!(cart.product_list().is_empty());

        fill(&mut cart, &catalog, &[("C", 3), ("B", 1)]);

        let mut list: Vec<_> = cart
            .product_list()
            .iter()
            .map(|line| (line.product.name().to_string(), line.quantity))
            .collect();
        list.sort();
        assert_eq!(list, vec![("B".to_string(), 1), ("C".to_string(), 3)]);
    }

    #[test]
    fn test_marked_price() {
        let catalog = store();
        let mut cart = Cart::new();
        assert_eq!(cart.marked_price().unwrap(), Money::zero());

        fill(&mut cart, &catalog, &[("A", 1)]);
        assert_eq!(cart.marked_price().unwrap().cents(), 2999);

        fill(&mut cart, &catalog, &[("A", 1)]);
        assert_eq!(cart.marked_price().unwrap().cents(), 5998);

        fill(&mut cart, &catalog, &[("A", 1)]);
        assert_eq!(cart.marked_price().unwrap().cents(), 8997);

        fill(&mut cart, &catalog, &[("B", 2)]);
        assert_eq!(cart.marked_price().unwrap().cents(), 48995);
    }

    #[test]
    fn test_discount_without_offers_is_zero() {
        let catalog = store();
        let mut cart = Cart::new();
        assert_eq!(cart.discount(None).unwrap(), Money::zero());

        fill(&mut cart, &catalog, &[("A", 3)]);
        assert_eq!(cart.marked_price().unwrap().cents(), 8997);
        assert_eq!(cart.discount(None).unwrap(), Money::zero());
    }

    #[test]
    fn test_discount_no_global() {
        let catalog = store();
        let mut cart = Cart::new();

        fill(&mut cart, &catalog, &[("C", 1)]);
        assert_eq!(cart.discount(None).unwrap(), Money::zero());

        fill(&mut cart, &catalog, &[("A", 1), ("C", 1)]);
        assert_eq!(cart.discount(None).unwrap().cents(), 10000);
    }

    #[test]
    fn test_half_off_offer() {
        let mut catalog = Catalog::with_seed(0);
        let offer = DiscountOffer::new(2, pct(50.0)).unwrap();
        let product = Product::new(ProductId(1), "P", Money::from_cents(10000), Some(offer)).unwrap();
        catalog
            .insert_product(product, vec![ItemId(1), ItemId(2)])
            .unwrap();

        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("P", 2)]);
        assert_eq!(cart.discount(None).unwrap().cents(), 5000);
    }

    #[test]
    fn test_sub_cent_discount_rounds_half_away_from_zero() {
        let catalog = store();

        // 1 group: 199.99 × 50% = 99.995 → 100.00
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("B", 3)]);
        assert_eq!(cart.discount(None).unwrap().cents(), 10000);

        // 3 groups: 299.985 → 299.99
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("B", 9)]);
        assert_eq!(cart.discount(None).unwrap().cents(), 29999);
    }

    #[test]
    fn test_discount_with_global() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("B", 10), ("C", 3)]);

        // product: 299.985 + 100 = 399.985; global: 1899.915 × 10% = 189.9915
        let discount = cart.discount(Some(&global(100_000, 1000))).unwrap();
        assert_eq!(discount.cents(), 58998);
    }

    #[test]
    fn test_global_discount_below_threshold_contributes_nothing() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("A", 10), ("C", 3)]);

        // 599.90 marked, 499.90 after offers: below a 600 threshold
        assert_eq!(cart.discount(None).unwrap().cents(), 10000);
        assert_eq!(
            cart.discount(Some(&global(60_000, 1000))).unwrap().cents(),
            10000
        );
    }

    #[test]
    fn test_global_discount_threshold_is_inclusive() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("A", 10), ("C", 3)]);

        // after offers: exactly 499.90
        let discount = cart.discount(Some(&global(49_990, 1000))).unwrap();
        assert_eq!(discount.cents(), 10000 + 4999);
    }

    #[test]
    fn test_invalid_global_discount_is_invalid_argument() {
        let err: CoreError = GlobalDiscount::new(Money::zero(), Percentage::from_bps(4000))
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err
            .to_string()
            .contains("The required total cost of the purchase for global discount must be positive. $0.00 is given instead."));

        let err: CoreError = GlobalDiscount::new(Money::from_cents(100_000), Percentage::FULL)
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("100% is given instead"));

        for (threshold, bps) in [(-100, 1000), (100, 0), (100, -10)] {
            assert!(GlobalDiscount::new(Money::from_cents(threshold), Percentage::from_bps(bps)).is_err());
        }
    }

    #[test]
    fn test_most_expensive_units_price_without_overflow() {
        let mut catalog = Catalog::with_seed(0);
        let offer = DiscountOffer::new(2, Percentage::FULL).unwrap();
        let product =
            Product::new(ProductId(1), "Yacht", Money::MAX_UNIT_PRICE, Some(offer)).unwrap();
        catalog
            .insert_product(product, (1..=4).map(ItemId).collect())
            .unwrap();

        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("Yacht", 4)]);

        let max = Money::MAX_UNIT_PRICE.cents();
        assert_eq!(cart.marked_price().unwrap().cents(), 4 * max);
        assert_eq!(cart.discount(None).unwrap().cents(), 2 * max);
        assert_eq!(
            cart.total_price(pct(100.0), Some(&global(1, 9999))).unwrap().cents(),
            // 2 units left, 99.99% off, then doubled by 100% tax
            2 * (2 * max - (2 * max * 9999 / 10_000))
        );
    }

    #[test]
    fn test_price_before_tax() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("A", 10), ("C", 3)]);

        assert_eq!(cart.price_before_tax(None).unwrap().cents(), 49990);
        assert_eq!(
            cart.price_before_tax(Some(&global(60_000, 1000)))
                .unwrap()
                .cents(),
            49990
        );
        assert_eq!(
            cart.price_before_tax(Some(&global(40_000, 1000)))
                .unwrap()
                .cents(),
            44991
        );
    }

    #[test]
    fn test_tax_amount_invalid() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("C", 1)]);

        let err = cart.tax_amount(pct(-10.0), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err
            .to_string()
            .contains("Tax rate must be non-negative. -10% is given instead."));

        assert!(cart.total_price(pct(-0.01), None).is_err());
        assert!(cart.price_breakdown(pct(-1.0), None).is_err());
    }

    #[test]
    fn test_tax_amount() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("C", 3)]);

        assert_eq!(cart.tax_amount(pct(5.0), None).unwrap().cents(), 1000);
        assert_eq!(cart.tax_amount(Percentage::zero(), None).unwrap(), Money::zero());
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("A", 1)]);

        // 29.99 × 8.25% = 2.474175 → 2.47
        assert_eq!(cart.tax_amount(pct(8.25), None).unwrap().cents(), 247);
        // 29.99 × 5% = 1.4995 → 1.50
        assert_eq!(cart.tax_amount(pct(5.0), None).unwrap().cents(), 150);
    }

    #[test]
    fn test_total_price() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("C", 5)]);

        assert_eq!(cart.total_price(pct(5.0), None).unwrap().cents(), 31500);
    }

    #[test]
    fn test_total_is_before_tax_plus_tax() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("A", 7), ("B", 8), ("C", 5)]);

        let globals = [None, Some(global(50_000, 1250)), Some(global(10_000_000, 500))];
        for rate in [0.0, 5.0, 8.25, 19.6] {
            for g in &globals {
                let before = cart.price_before_tax(g.as_ref()).unwrap();
                let tax = cart.tax_amount(pct(rate), g.as_ref()).unwrap();
                let total = cart.total_price(pct(rate), g.as_ref()).unwrap();
                assert_eq!(Some(total), before.checked_add(tax));
            }
        }
    }

    #[test]
    fn test_price_breakdown() {
        let catalog = store();
        let mut cart = Cart::new();
        fill(&mut cart, &catalog, &[("B", 10), ("C", 3)]);

        let g = global(100_000, 1000);
        let breakdown = cart.price_breakdown(pct(5.0), Some(&g)).unwrap();
        assert_eq!(breakdown.discount.cents(), 58998);
        // 2299.90 − 589.98 = 1709.92; × 5% = 85.496 → 85.50
        assert_eq!(breakdown.tax.cents(), 8550);
        assert_eq!(breakdown.total.cents(), 170992 + 8550);
    }

    #[test]
    fn test_price_breakdown_serializes() {
        let breakdown = PriceBreakdown {
            discount: Money::from_cents(100),
            tax: Money::from_cents(5),
            total: Money::from_cents(1005),
        };
        let json = serde_json::to_value(breakdown).unwrap();
        assert_eq!(json, serde_json::json!({"discount": 100, "tax": 5, "total": 1005}));
    }

    #[test]
    fn test_cart_ids_are_unique() {
        let a = Cart::new();
        let b = Cart::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(Cart::with_id("cart-1").id(), "cart-1");
    }
}
