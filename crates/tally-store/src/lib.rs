//! # tally-store: Store Setup for Tally
//!
//! Loads a store description from TOML and seeds a [`tally_core::Catalog`]
//! from it. The `checkout` binary is built on top of this crate.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   store.toml ──► StoreConfig::load ──► validate ──► populate            │
//! │   + TALLY_* env                                        │                │
//! │                                                        ▼                │
//! │                                     Catalog (tally-core) ──► Cart       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - TOML configuration with env overrides
//! - [`seed`] - Id generation and catalog population
//! - [`error`] - Store error types

pub mod config;
pub mod error;
pub mod seed;

pub use config::{parse_tax_rate, GlobalDiscountConfig, PricingSettings, ProductConfig, PromotionConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use seed::{populate, IdGenerator};
