use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, ProductId};

/// A product or variant as the catalog hands it to the export.
///
/// Read-only from the export's perspective; the catalog owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// `None` for standalone products and family heads.
    #[serde(default)]
    pub parent_id: Option<ProductId>,
    pub product_number: String,
    #[serde(default)]
    pub name: String,
    /// One entry per currency.
    #[serde(default)]
    pub prices: Vec<CurrencyPrice>,
    /// Quantity-banded, rule-scoped overrides of `prices`.
    #[serde(default)]
    pub tiers: Vec<PriceTier>,
    /// Statically assigned categories.
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub available_stock: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Filterable properties, e.g. `"color" -> ["red"]`.
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
    /// Storefront path relative to the shop URL, e.g. `"shirts/red-shirt"`.
    #[serde(default)]
    pub seo_path: Option<String>,
    /// The catalog's own preferred variant for this family. Only meaningful
    /// on family heads.
    #[serde(default)]
    pub main_variant_id: Option<ProductId>,
}

impl Product {
    #[must_use]
    pub fn is_family_head(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Active and visible in the storefront.
    #[must_use]
    pub fn is_exportable(&self) -> bool {
        self.active && self.visible
    }

    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.available_stock > 0
    }

    #[must_use]
    pub fn price_in(&self, currency: &str) -> Option<&CurrencyPrice> {
        self.prices.iter().find(|p| p.currency == currency)
    }

    /// Unrounded gross price in `currency`, if the product has one.
    #[must_use]
    pub fn gross_in(&self, currency: &str) -> Option<Decimal> {
        self.price_in(currency).map(|p| p.gross)
    }
}

/// Net and gross amount of a price in one currency.
///
/// Amounts are kept at full precision; rounding is the exporter's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPrice {
    pub currency: String,
    pub net: Decimal,
    pub gross: Decimal,
    /// Strike-through gross price, when the catalog has one.
    #[serde(default)]
    pub list_price: Option<Decimal>,
}

impl CurrencyPrice {
    pub fn new(currency: impl Into<String>, net: Decimal, gross: Decimal) -> Self {
        Self {
            currency: currency.into(),
            net,
            gross,
            list_price: None,
        }
    }

    /// The gross amount when `display_gross` is set, otherwise the net amount.
    #[must_use]
    pub fn amount(&self, display_gross: bool) -> Decimal {
        if display_gross {
            self.gross
        } else {
            self.net
        }
    }
}

/// A quantity band price that only applies to customers matching `rule_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub quantity_min: u32,
    #[serde(default)]
    pub quantity_max: Option<u32>,
    pub rule_id: String,
    pub prices: Vec<CurrencyPrice>,
}

impl PriceTier {
    #[must_use]
    pub fn price_in(&self, currency: &str) -> Option<&CurrencyPrice> {
        self.prices.iter().find(|p| p.currency == currency)
    }
}

/// A family head together with its variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantFamily {
    pub head: Product,
    /// Sorted by product id so selection never depends on catalog order.
    pub children: Vec<Product>,
}

impl VariantFamily {
    #[must_use]
    pub fn new(head: Product, mut children: Vec<Product>) -> Self {
        children.retain(|c| c.parent_id.as_ref() == Some(&head.id));
        children.sort_by(|a, b| a.id.cmp(&b.id));
        Self { head, children }
    }

    /// The head followed by its children.
    pub fn members(&self) -> impl Iterator<Item = &Product> {
        std::iter::once(&self.head).chain(self.children.iter())
    }

    #[must_use]
    pub fn member(&self, id: &ProductId) -> Option<&Product> {
        self.members().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn product_numbers(&self) -> Vec<String> {
        self.members().map(|p| p.product_number.clone()).collect()
    }
}

/// Serde default for flags that are on unless the catalog says otherwise.
fn default_true() -> bool {
    true
}
