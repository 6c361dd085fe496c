//! # Store Configuration
//!
//! Loads the product catalog description and pricing settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_TAX_RATE=8.25                                                │
//! │     TALLY_RNG_SEED=42                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, else $TALLY_CONFIG, else                            │
//! │     ~/.config/tally/store.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.tally.store/store.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no products, 0% tax, no global discount                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! rng_seed = 42
//!
//! [pricing]
//! tax_rate = 5.0
//!
//! [pricing.global_discount]
//! required_purchase_total = 1000.0
//! rate = 10.0
//!
//! [[products]]
//! name = "Dove Soap"
//! unit_price = 39.99
//! number_in_store = 50
//!
//! [[products]]
//! name = "Axe Deo"
//! unit_price = 99.99
//! number_in_store = 20
//! promotion = { required_quantity = 2, percentage = 50.0 }
//! ```
//!
//! Prices and rates are plain decimals in the file and are converted to
//! `Money` (cents) and `Percentage` (basis points) at this boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use tally_core::validation;
use tally_core::{DiscountOffer, GlobalDiscount, Money, Percentage, Product, ProductId};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Product Entries
// =============================================================================

/// "Buy N, get the next one X% off" as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionConfig {
    pub required_quantity: i64,
    /// Percentage off, e.g. `50.0`.
    pub percentage: f64,
}

impl PromotionConfig {
    /// Builds the validated core offer.
    pub fn to_offer(&self) -> Result<DiscountOffer, tally_core::ValidationError> {
        let percentage = Percentage::try_from_percentage("Discount percentage", self.percentage)?;
        DiscountOffer::new(self.required_quantity, percentage)
    }
}

/// One `[[products]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
    pub unit_price: f64,
    /// Units to create, all available.
    pub number_in_store: u32,
    #[serde(default)]
    pub promotion: Option<PromotionConfig>,
}

impl ProductConfig {
    /// Builds the validated core product (without units).
    pub fn to_product(&self, id: ProductId) -> StoreResult<Product> {
        let offer = self
            .promotion
            .as_ref()
            .map(PromotionConfig::to_offer)
            .transpose()
            .map_err(|source| self.invalid(source))?;

        Money::try_from_decimal("Unit price", self.unit_price)
            .and_then(|price| Product::new(id, self.name.as_str(), price, offer))
            .map_err(|source| self.invalid(source))
    }

    fn invalid(&self, source: tally_core::ValidationError) -> StoreError {
        StoreError::InvalidProduct {
            name: self.name.clone(),
            source,
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Store-wide discount as written in the config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalDiscountConfig {
    pub required_purchase_total: f64,
    /// Percentage off, e.g. `10.0`.
    pub rate: f64,
}

impl GlobalDiscountConfig {
    pub fn to_global_discount(&self) -> Result<GlobalDiscount, tally_core::ValidationError> {
        let threshold = Money::try_from_decimal(
            "The required total cost of the purchase for global discount",
            self.required_purchase_total,
        )?;
        let rate = Percentage::try_from_percentage("Global discount rate", self.rate)?;
        GlobalDiscount::new(threshold, rate)
    }
}

/// Checkout pricing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Tax rate in percent, e.g. `8.25`.
    #[serde(default)]
    pub tax_rate: f64,

    /// Optional store-wide threshold discount.
    #[serde(default)]
    pub global_discount: Option<GlobalDiscountConfig>,
}

// =============================================================================
// Main Store Configuration
// =============================================================================

/// Complete store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Seed for randomized allocation. `None` draws from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `$TALLY_CONFIG`, else the
    ///    platform config dir)
    /// 3. Environment variables
    ///
    /// An explicitly given path must exist; the fallback paths may be
    /// missing, in which case defaults are used.
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                info!(?path, "Loading store config from file");
                config = Self::from_toml_str(&std::fs::read_to_string(&path)?)?;
            }
            None => {
                if let Some(path) = Self::fallback_config_path() {
                    if path.exists() {
                        info!(?path, "Loading store config from file");
                        config = Self::from_toml_str(&std::fs::read_to_string(&path)?)?;
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        info!(
            products = config.products.len(),
            tax_rate = config.pricing.tax_rate,
            global_discount = config.pricing.global_discount.is_some(),
            "Store config loaded"
        );
        Ok(config)
    }

    /// Parses a TOML document. Does not validate.
    pub fn from_toml_str(contents: &str) -> StoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    ///
    /// Checks every product entry with the same rules the catalog enforces,
    /// so a config that validates always seeds cleanly.
    pub fn validate(&self) -> StoreResult<()> {
        let mut names = HashSet::new();
        for product in &self.products {
            if !names.insert(product.name.as_str()) {
                return Err(StoreError::InvalidConfig(format!(
                    "duplicate product name '{}'",
                    product.name
                )));
            }
            product.to_product(ProductId(0))?;
        }

        self.tax_rate()?;
        self.global_discount()?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(rate) = var("TALLY_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(parsed) => {
                    debug!(tax_rate = parsed, "Overriding tax rate from environment");
                    self.pricing.tax_rate = parsed;
                }
                Err(_) => warn!(value = %rate, "Ignoring unparsable TALLY_TAX_RATE"),
            }
        }

        if let Some(seed) = var("TALLY_RNG_SEED") {
            match seed.parse::<u64>() {
                Ok(parsed) => {
                    debug!(seed = parsed, "Overriding RNG seed from environment");
                    self.rng_seed = Some(parsed);
                }
                Err(_) => warn!(value = %seed, "Ignoring unparsable TALLY_RNG_SEED"),
            }
        }
    }

    fn fallback_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TALLY_CONFIG") {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Returns the platform default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "store")
            .map(|dirs| dirs.config_dir().join("store.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Configured tax rate, validated.
    pub fn tax_rate(&self) -> StoreResult<Percentage> {
        parse_tax_rate(self.pricing.tax_rate)
    }

    /// Configured global discount, validated.
    pub fn global_discount(&self) -> StoreResult<Option<GlobalDiscount>> {
        self.pricing
            .global_discount
            .as_ref()
            .map(GlobalDiscountConfig::to_global_discount)
            .transpose()
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))
    }
}

/// Converts a decimal tax rate (`8.25` for 8.25%) into a validated
/// [`Percentage`].
///
/// Rejects non-finite values, values finer than a basis point, and negative
/// rates, all before any rounding happens.
pub fn parse_tax_rate(pct: f64) -> StoreResult<Percentage> {
    Percentage::try_from_percentage("Tax rate", pct)
        .and_then(|rate| validation::validate_tax_rate(rate).map(|()| rate))
        .map_err(|e| StoreError::InvalidConfig(e.to_string()))
}
