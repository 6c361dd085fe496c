//! # Store Error Types
//!
//! Error types for configuration loading and catalog seeding.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / toml::de::Error ──┐                                       │
//! │                                 ├──► StoreError (this module)          │
//! │  ValidationError / CoreError ──┘          │                            │
//! │                                            ▼                            │
//! │                                  checkout binary prints it             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Configuration and seeding failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has the wrong shape.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config is well-formed but violates a store-level rule.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// A product entry fails validation.
    #[error("Invalid product '{name}': {source}")]
    InvalidProduct {
        name: String,
        #[source]
        source: ValidationError,
    },

    /// Error raised by the catalog or pricing engine.
    #[error(transparent)]
    Core(#[from] CoreError),
}
