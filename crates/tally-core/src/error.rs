//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Catalog / cart failures                        │
//! │  └── ValidationError  - Precondition violations on input values        │
//! │                                                                         │
//! │  tally-store errors (separate crate)                                   │
//! │  └── StoreError       - Config file / seeding failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → checkout binary      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! Every `CoreError` falls into one [`ErrorKind`]:
//!
//! | Kind              | Variant(s)                                       |
//! |-------------------|--------------------------------------------------|
//! | `NotFound`        | `ProductNotFound`                                |
//! | `InvalidArgument` | `Validation(_)`                                  |
//! | `OverDemand`      | `InsufficientStock`                              |
//! | `InvalidState`    | `DuplicateProduct`, `DuplicateItem`, `LockPoisoned` |

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// All of these are raised before any state is mutated, so the catalog and
/// the cart are exactly as they were before the failing call.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this name exists in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough available units to satisfy an allocation.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart ("Dove Soap", qty: 5)
    ///      │
    ///      ▼
    /// Check available units: 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Dove Soap", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A second product with an existing name was inserted.
    #[error("Product '{0}' already exists in the catalog")]
    DuplicateProduct(String),

    /// A unit id was registered twice.
    #[error("Item {0} is already registered in the catalog")]
    DuplicateItem(u64),

    /// The catalog's inventory lock was poisoned by a panicking holder.
    #[error("Catalog inventory lock poisoned")]
    LockPoisoned,

    /// A price figure of the cart does not fit in `Money`.
    #[error("Cart amount exceeds the representable range")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Error category, independent of the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lookup miss.
    NotFound,
    /// Caller passed a value violating a precondition.
    InvalidArgument,
    /// Requested allocation exceeds availability.
    OverDemand,
    /// Catalog invariant violated.
    InvalidState,
}

impl CoreError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_) => ErrorKind::NotFound,
            CoreError::Validation(_) | CoreError::AmountOverflow => ErrorKind::InvalidArgument,
            CoreError::InsufficientStock { .. } => ErrorKind::OverDemand,
            CoreError::DuplicateProduct(_)
            | CoreError::DuplicateItem(_)
            | CoreError::LockPoisoned => ErrorKind::InvalidState,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the field and echoes the rejected value so the
/// message alone is enough to locate the bad input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive. {value} is given instead.")]
    MustBePositive { field: String, value: String },

    /// Value must be zero or greater.
    #[error("{field} must be non-negative. {value} is given instead.")]
    MustBeNonNegative { field: String, value: String },

    /// Decimal input is not finite or is finer than the smallest unit.
    #[error("{field} must be a finite number of whole {unit}. {value} is given instead.")]
    Unrepresentable {
        field: String,
        unit: String,
        value: String,
    },

    /// Value lies outside its allowed interval.
    ///
    /// `bounds` is a human-readable interval such as `(0, 100)`.
    #[error("{field} must be within {bounds}. {value} is given instead.")]
    OutOfRange {
        field: String,
        bounds: String,
        value: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
