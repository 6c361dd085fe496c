//! End-to-end checkout: TOML on disk, seeded catalog, priced cart.

use std::io::Write;

use tally_core::{AllocationStrategy, Cart, ErrorKind, GlobalDiscount, Money, Percentage};
use tally_store::{populate, IdGenerator, StoreConfig, StoreError};

const STORE: &str = r#"
rng_seed = 42

[pricing]
tax_rate = 0.0

[pricing.global_discount]
required_purchase_total = 1000.0
rate = 10.0

[[products]]
name = "A"
unit_price = 29.99
number_in_store = 30

[[products]]
name = "B"
unit_price = 199.99
number_in_store = 20
promotion = { required_quantity = 3, percentage = 50.0 }

[[products]]
name = "C"
unit_price = 100.0
number_in_store = 10
promotion = { required_quantity = 2, percentage = 100.0 }
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config() -> StoreConfig {
    let file = write_config(STORE);
    StoreConfig::load(Some(file.path().to_path_buf())).unwrap()
}

fn global(total_cents: i64, rate_bps: i64) -> GlobalDiscount {
    GlobalDiscount::new(Money::from_cents(total_cents), Percentage::from_bps(rate_bps)).unwrap()
}

#[test]
fn load_and_seed_from_file() {
    let config = config();
    let catalog = populate(&config, &mut IdGenerator::new()).unwrap();

    assert_eq!(catalog.products().len(), 3);
    assert_eq!(catalog.item_count(), 60);
    assert_eq!(catalog.available_count("B").unwrap(), 20);
    assert!(config.global_discount().unwrap().is_some());
}

#[test]
fn promotions_and_global_discount() {
    let config = config();
    let catalog = populate(&config, &mut IdGenerator::new()).unwrap();

    let mut cart = Cart::new();
    cart.add_product_items(&catalog, "B", 10, AllocationStrategy::Ordered)
        .unwrap();
    cart.add_product_items(&catalog, "C", 3, AllocationStrategy::Ordered)
        .unwrap();

    let global = config.global_discount().unwrap();
    assert_eq!(cart.marked_price().unwrap().cents(), 229_990);
    assert_eq!(cart.discount(global.as_ref()).unwrap().cents(), 58998);
    assert_eq!(
        cart.price_before_tax(global.as_ref()).unwrap().cents(),
        170_992
    );

    let breakdown = cart
        .price_breakdown(config.tax_rate().unwrap(), global.as_ref())
        .unwrap();
    assert_eq!(breakdown.discount.cents(), 58998);
    assert_eq!(breakdown.tax, Money::zero());
    assert_eq!(breakdown.total.cents(), 170_992);
}

#[test]
fn global_discount_threshold() {
    let catalog = populate(&config(), &mut IdGenerator::new()).unwrap();

    let mut cart = Cart::new();
    cart.add_product_items(&catalog, "A", 10, AllocationStrategy::Ordered)
        .unwrap();
    cart.add_product_items(&catalog, "C", 3, AllocationStrategy::Ordered)
        .unwrap();

    assert_eq!(cart.price_before_tax(None).unwrap().cents(), 49990);
    assert_eq!(
        cart.price_before_tax(Some(&global(60000, 1000))).unwrap().cents(),
        49990
    );
    assert_eq!(
        cart.price_before_tax(Some(&global(40000, 1000))).unwrap().cents(),
        44991
    );
}

#[test]
fn tax_and_total() {
    let catalog = populate(&config(), &mut IdGenerator::new()).unwrap();
    let five = Percentage::from_bps(500);

    let mut three = Cart::new();
    three
        .add_product_items(&catalog, "C", 3, AllocationStrategy::Ordered)
        .unwrap();
    assert_eq!(three.tax_amount(five, None).unwrap().cents(), 1000);

    let mut five_units = Cart::new();
    five_units
        .add_product_items(&catalog, "C", 5, AllocationStrategy::Ordered)
        .unwrap();
    assert_eq!(five_units.total_price(five, None).unwrap().cents(), 31500);
}

#[test]
fn carts_share_the_catalog_stock() {
    let catalog = populate(&config(), &mut IdGenerator::new()).unwrap();

    let mut first = Cart::new();
    first
        .add_product_items(&catalog, "C", 8, AllocationStrategy::Randomized)
        .unwrap();

    let mut second = Cart::new();
    let err = second
        .add_product_items(&catalog, "C", 3, AllocationStrategy::Randomized)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OverDemand);
    assert!(second.is_empty());
    assert_eq!(catalog.available_count("C").unwrap(), 2);

    for unit in first.items() {
        assert!(!catalog.is_available(unit.id()).unwrap());
    }
}

#[test]
fn seeded_random_allocation_is_reproducible() {
    let config = config();
    let pick = || {
        let catalog = populate(&config, &mut IdGenerator::new()).unwrap();
        let units = catalog
            .allocate("A", 5, AllocationStrategy::Randomized)
            .unwrap();
        let mut ids: Vec<u64> = units.iter().map(|u| u.id().0).collect();
        ids.sort_unstable();
        ids
    };

    assert_eq!(pick(), pick());
}

#[test]
fn invalid_file_is_rejected() {
    let file = write_config("[pricing]\ntax_rate = -10.0\n");
    let err = StoreConfig::load(Some(file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, StoreError::InvalidConfig(ref msg) if msg.contains("-10")));

    let file = write_config("[[products]]\nname = \"X\"\n");
    let err = StoreConfig::load(Some(file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, StoreError::Parse(_)));
}

#[test]
fn unrepresentable_decimals_are_rejected() {
    let file = write_config("[pricing]\ntax_rate = -0.004\n");
    assert!(StoreConfig::load(Some(file.path().to_path_buf())).is_err());

    let file = write_config("[pricing]\ntax_rate = nan\n");
    assert!(StoreConfig::load(Some(file.path().to_path_buf())).is_err());

    let file = write_config(
        "[[products]]\nname = \"Huge\"\nunit_price = 1e17\nnumber_in_store = 2\n",
    );
    let err = StoreConfig::load(Some(file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, StoreError::InvalidProduct { ref name, .. } if name == "Huge"));
}
