//! # Checkout
//!
//! Loads a store, fills a cart, and prints the price breakdown as JSON.
//!
//! ## Usage
//! ```bash
//! # Price 10 units of B and 3 of C from an explicit config
//! cargo run -p tally-store --bin checkout -- \
//!     --config config/store.example.toml --add B=10 --add C=3
//!
//! # Random unit selection, overriding the configured tax rate
//! cargo run -p tally-store --bin checkout -- --add A=2 --random --tax-rate 8.25
//! ```
//!
//! Log output goes to stderr; set `RUST_LOG` to change verbosity.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally_core::{AllocationStrategy, Cart, Money, PriceBreakdown};
use tally_store::{parse_tax_rate, populate, IdGenerator, StoreConfig};

/// Price a cart against a configured store.
#[derive(Debug, Parser)]
#[command(name = "checkout", version, about)]
struct Args {
    /// Path to the store config (defaults to $TALLY_CONFIG, then the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Product and quantity to add, as NAME=QTY. Repeatable.
    #[arg(long = "add", value_name = "NAME=QTY", value_parser = parse_line)]
    lines: Vec<(String, i64)>,

    /// Pick units at random instead of in id order
    #[arg(long)]
    random: bool,

    /// Tax rate in percent, overriding the config
    #[arg(long)]
    tax_rate: Option<f64>,

    /// Ignore the configured store-wide discount
    #[arg(long)]
    no_global: bool,
}

fn parse_line(raw: &str) -> Result<(String, i64), String> {
    let (name, qty) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got '{raw}'"))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad quantity in '{raw}': {e}"))?;
    Ok((name.trim().to_string(), qty))
}

#[derive(Debug, Serialize)]
struct LineReport {
    product: String,
    quantity: i64,
    unit_price: Money,
}

#[derive(Debug, Serialize)]
struct CheckoutReport {
    cart_id: String,
    lines: Vec<LineReport>,
    marked_price: Money,
    price_before_tax: Money,
    tax_rate: String,
    #[serde(flatten)]
    breakdown: PriceBreakdown,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let args = Args::parse();
    let config = StoreConfig::load(args.config)?;
    let catalog = populate(&config, &mut IdGenerator::new())?;

    let strategy = if args.random {
        AllocationStrategy::Randomized
    } else {
        AllocationStrategy::Ordered
    };

    let mut cart = Cart::new();
    for (name, qty) in &args.lines {
        cart.add_product_items(&catalog, name, *qty, strategy)?;
    }

    let tax_rate = match args.tax_rate {
        Some(pct) => parse_tax_rate(pct)?,
        None => config.tax_rate()?,
    };
    let global = if args.no_global {
        None
    } else {
        config.global_discount()?
    };

    let breakdown = cart.price_breakdown(tax_rate, global.as_ref())?;
    info!(
        cart_id = %cart.id(),
        units = cart.len(),
        total = %breakdown.total,
        "Checkout priced"
    );

    let report = CheckoutReport {
        cart_id: cart.id().to_string(),
        lines: cart
            .product_list()
            .into_iter()
            .map(|line| LineReport {
                product: line.product.name().to_string(),
                quantity: line.quantity,
                unit_price: line.product.unit_price(),
            })
            .collect(),
        marked_price: cart.marked_price()?,
        price_before_tax: cart.price_before_tax(global.as_ref())?,
        tax_rate: tax_rate.to_string(),
        breakdown,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally_core=debug,tally_store=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
