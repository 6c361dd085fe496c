//! # tally-core: Pricing & Inventory Allocation Engine
//!
//! This crate is the **heart** of Tally. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             tally-store (config file → Catalog)                 │   │
//! │  │    StoreConfig::load ──► populate ──► checkout binary           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  catalog  │  │   cart    │  │   │
//! │  │   │  Product  │  │   Money   │  │  lookup   │  │  discount │  │   │
//! │  │   │   Item    │  │  Exact    │  │  allocate │  │  tax      │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Item, DiscountOffer, Percentage, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Precondition checks
//! - [`catalog`] - Product lookup and unit allocation
//! - [`cart`] - Cart and pricing engine
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{
//!     AllocationStrategy, Cart, Catalog, DiscountOffer, ItemId, Money, Percentage, Product,
//!     ProductId,
//! };
//!
//! let mut catalog = Catalog::with_seed(0);
//! let offer = DiscountOffer::new(2, Percentage::from_bps(10_000))?; // buy 2, next free
//! let tea = Product::new(ProductId(1), "Tea", Money::from_cents(10000), Some(offer))?;
//! catalog.insert_product(tea, (1..=10).map(ItemId).collect())?;
//!
//! let mut cart = Cart::new();
//! cart.add_product_items(&catalog, "Tea", 5, AllocationStrategy::Ordered)?;
//!
//! let tax = Percentage::from_bps(500); // 5%
//! assert_eq!(cart.discount(None)?.cents(), 20000);
//! assert_eq!(cart.total_price(tax, None)?.cents(), 31500);
//! # Ok::<(), tally_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, ProductQuantity};
pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::{ExactAmount, Money};
pub use types::*;
