use std::path::Path;

use super::*;

const SHOPKEY: &str = "ABCDEF0123456789ABCDEF0123456789";

fn make_shop(shopkey: &str) -> ShopConfig {
    ShopConfig {
        shopkey: shopkey.to_string(),
        shop_url: "https://shop.example".to_string(),
        navigation_root: CategoryId::new("root"),
        currency: "EUR".to_string(),
        variant_policy: VariantPolicy::default(),
        advanced_pricing: AdvancedPricingMode::default(),
        hide_out_of_stock: false,
        default_display_gross: true,
        customer_groups: vec![],
    }
}

fn make_group(id: &str) -> CustomerGroup {
    CustomerGroup {
        id: id.to_string(),
        display_gross: true,
        rule_id: None,
    }
}

#[test]
fn valid_shop_passes_validation() {
    let file = ShopsFile {
        shops: vec![make_shop(SHOPKEY)],
    };
    assert!(validate_shops(&file).is_ok());
}

#[test]
fn short_shopkey_is_rejected() {
    let file = ShopsFile {
        shops: vec![make_shop("ABC")],
    };
    let err = validate_shops(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("32 hexadecimal")));
}

#[test]
fn non_hex_shopkey_is_rejected() {
    let file = ShopsFile {
        shops: vec![make_shop("ZZZZEF0123456789ABCDEF0123456789")],
    };
    assert!(validate_shops(&file).is_err());
}

#[test]
fn duplicate_shopkey_is_rejected_case_insensitively() {
    let file = ShopsFile {
        shops: vec![make_shop(SHOPKEY), make_shop(&SHOPKEY.to_lowercase())],
    };
    let err = validate_shops(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate shopkey")));
}

#[test]
fn non_http_shop_url_is_rejected() {
    let mut shop = make_shop(SHOPKEY);
    shop.shop_url = "shop.example".to_string();
    let file = ShopsFile { shops: vec![shop] };
    assert!(validate_shops(&file).is_err());
}

#[test]
fn lowercase_currency_is_rejected() {
    let mut shop = make_shop(SHOPKEY);
    shop.currency = "eur".to_string();
    let file = ShopsFile { shops: vec![shop] };
    let err = validate_shops(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("ISO 4217")));
}

#[test]
fn duplicate_customer_group_is_rejected() {
    let mut shop = make_shop(SHOPKEY);
    shop.customer_groups = vec![make_group("retail"), make_group("retail")];
    let file = ShopsFile { shops: vec![shop] };
    let err = validate_shops(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("twice")));
}

#[test]
fn find_returns_matching_shop() {
    let file = ShopsFile {
        shops: vec![make_shop(SHOPKEY)],
    };
    assert!(file.find(SHOPKEY).is_some());
    assert!(file.find("missing").is_none());
}

#[test]
fn yaml_defaults_are_applied() {
    let yaml = r"
shops:
  - shopkey: ABCDEF0123456789ABCDEF0123456789
    shop_url: https://shop.example
    navigation_root: root
    customer_groups:
      - id: b2b
        display_gross: false
        rule_id: rule-b2b
";
    let file: ShopsFile = serde_yaml::from_str(yaml).unwrap();
    let shop = &file.shops[0];
    assert_eq!(shop.currency, "EUR");
    assert_eq!(shop.variant_policy, VariantPolicy::HostDefault);
    assert_eq!(shop.advanced_pricing, AdvancedPricingMode::Off);
    assert!(shop.default_display_gross);
    assert!(!shop.customer_groups[0].display_gross);
    assert_eq!(shop.customer_groups[0].rule_id.as_deref(), Some("rule-b2b"));
}

#[test]
fn policies_parse_from_kebab_and_lowercase() {
    let policy: VariantPolicy = serde_yaml::from_str("main-parent").unwrap();
    assert_eq!(policy, VariantPolicy::MainParent);
    let mode: AdvancedPricingMode = serde_yaml::from_str("cheapest").unwrap();
    assert_eq!(mode, AdvancedPricingMode::Cheapest);
    assert_eq!(VariantPolicy::Cheapest.to_string(), "cheapest");
    assert_eq!(AdvancedPricingMode::Unit.to_string(), "unit");
}

#[test]
fn load_shops_reports_missing_file() {
    let err = load_shops(Path::new("/nonexistent/shops.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ShopsFileIo { .. }));
}

#[test]
fn bundled_shops_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("shops.yaml");
    let file = load_shops(&path).expect("bundled config/shops.yaml should load");
    assert!(!file.shops.is_empty());
}
