//! # Validation Module
//!
//! Precondition checks for every value entering the catalog or the pricing
//! engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Constructors                                                           │
//! │  ├── Product::new        → name, unit price                            │
//! │  ├── DiscountOffer::new  → required quantity, percentage               │
//! │  └── GlobalDiscount::new → threshold, rate                             │
//! │                                                                         │
//! │  Operations                                                             │
//! │  ├── Catalog::allocate   → quantity                                    │
//! │  └── Cart::tax_amount    → tax rate                                    │
//! │                                                                         │
//! │  Every check runs before any state is touched.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_quantity, validate_tax_rate};
//! use tally_core::types::Percentage;
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_tax_rate(Percentage::from_bps(-1)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Percentage;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name: must not be blank.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Product name".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price: `0 < price <= Money::MAX_UNIT_PRICE`.
///
/// The cap keeps per-product figures far from the `i64` limit; cart totals
/// are still summed with checked arithmetic.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "Unit price".to_string(),
            value: price.to_string(),
        });
    }
    if price > Money::MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "Unit price".to_string(),
            bounds: format!("($0.00, {}]", Money::MAX_UNIT_PRICE),
            value: price.to_string(),
        });
    }

    Ok(())
}

/// Validates the "buy N" part of a discount offer.
pub fn validate_required_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Required quantity".to_string(),
            value: quantity.to_string(),
        });
    }

    Ok(())
}

/// Validates an offer percentage.
///
/// ## Rules
/// - `0% < percentage <= 100%`
/// - 100% is allowed (next unit free)
pub fn validate_offer_percentage(percentage: Percentage) -> ValidationResult<()> {
    if !percentage.is_positive() || percentage > Percentage::FULL {
        return Err(ValidationError::OutOfRange {
            field: "Discount percentage".to_string(),
            bounds: "(0%, 100%]".to_string(),
            value: percentage.to_string(),
        });
    }

    Ok(())
}

/// Validates a requested quantity.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Product Items                                                │
/// │                                                                         │
/// │  Caller asks for quantity: 5                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "Quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → Catalog looks up the product and allocates              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Quantity".to_string(),
            value: qty.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Pricing Validators
// =============================================================================

/// Validates a tax rate: must be zero or greater.
pub fn validate_tax_rate(rate: Percentage) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "Tax rate".to_string(),
            value: rate.to_string(),
        });
    }

    Ok(())
}

/// Validates the purchase total needed to unlock the global discount.
pub fn validate_purchase_threshold(total: Money) -> ValidationResult<()> {
    if !total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "The required total cost of the purchase for global discount".to_string(),
            value: total.to_string(),
        });
    }

    Ok(())
}

/// Validates the global discount rate: strictly between 0% and 100%.
pub fn validate_global_rate(rate: Percentage) -> ValidationResult<()> {
    if !rate.is_positive() || rate >= Percentage::FULL {
        return Err(ValidationError::OutOfRange {
            field: "Global discount rate".to_string(),
            bounds: "(0%, 100%)".to_string(),
            value: rate.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
