use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ids::CategoryId;
use crate::ConfigError;

/// How the representative of a variant family is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantPolicy {
    /// Whatever the host catalog ranks first.
    #[default]
    HostDefault,
    /// Always the family head.
    MainParent,
    /// The cheapest available member, head winning ties.
    Cheapest,
}

impl std::fmt::Display for VariantPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariantPolicy::HostDefault => write!(f, "host-default"),
            VariantPolicy::MainParent => write!(f, "main-parent"),
            VariantPolicy::Cheapest => write!(f, "cheapest"),
        }
    }
}

/// Which quantity tier, if any, replaces the standard price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvancedPricingMode {
    #[default]
    Off,
    /// The lowest-quantity tier.
    Unit,
    /// The tier with the lowest unit price.
    Cheapest,
}

impl std::fmt::Display for AdvancedPricingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvancedPricingMode::Off => write!(f, "off"),
            AdvancedPricingMode::Unit => write!(f, "unit"),
            AdvancedPricingMode::Cheapest => write!(f, "cheapest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerGroup {
    pub id: String,
    /// Customers of this group see gross prices.
    #[serde(default = "default_true")]
    pub display_gross: bool,
    /// Price rule matched by this group's tiers.
    #[serde(default)]
    pub rule_id: Option<String>,
}

/// Export settings of one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub shopkey: String,
    pub shop_url: String,
    /// Only streams bound to categories below this root are considered.
    pub navigation_root: CategoryId,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub variant_policy: VariantPolicy,
    #[serde(default)]
    pub advanced_pricing: AdvancedPricingMode,
    /// Out-of-stock variants never represent their family.
    #[serde(default)]
    pub hide_out_of_stock: bool,
    /// Display mode of the currency-default price record.
    #[serde(default = "default_true")]
    pub default_display_gross: bool,
    #[serde(default)]
    pub customer_groups: Vec<CustomerGroup>,
}

#[derive(Debug, Deserialize)]
pub struct ShopsFile {
    pub shops: Vec<ShopConfig>,
}

impl ShopsFile {
    #[must_use]
    pub fn find(&self, shopkey: &str) -> Option<&ShopConfig> {
        self.shops.iter().find(|s| s.shopkey == shopkey)
    }
}

/// Load and validate the shop configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_shops(path: &Path) -> Result<ShopsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ShopsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let shops_file: ShopsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::ShopsFileParse)?;

    validate_shops(&shops_file)?;

    Ok(shops_file)
}

fn validate_shops(shops_file: &ShopsFile) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();

    for shop in &shops_file.shops {
        if !is_valid_shopkey(&shop.shopkey) {
            return Err(ConfigError::Validation(format!(
                "shopkey '{}' must be 32 hexadecimal characters",
                shop.shopkey
            )));
        }

        if !seen_keys.insert(shop.shopkey.to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate shopkey: '{}'",
                shop.shopkey
            )));
        }

        if !(shop.shop_url.starts_with("https://") || shop.shop_url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "shop '{}' has invalid shop_url '{}'; expected an http(s) URL",
                shop.shopkey, shop.shop_url
            )));
        }

        if shop.currency.len() != 3 || !shop.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "shop '{}' has invalid currency '{}'; expected an ISO 4217 code",
                shop.shopkey, shop.currency
            )));
        }

        let mut seen_groups = HashSet::new();
        for group in &shop.customer_groups {
            if group.id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "shop '{}' has a customer group with an empty id",
                    shop.shopkey
                )));
            }
            if !seen_groups.insert(group.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "shop '{}' lists customer group '{}' twice",
                    shop.shopkey, group.id
                )));
            }
        }
    }

    Ok(())
}

fn is_valid_shopkey(shopkey: &str) -> bool {
    shopkey.len() == 32 && shopkey.chars().all(|c| c.is_ascii_hexdigit())
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
#[path = "shops_test.rs"]
mod tests;
