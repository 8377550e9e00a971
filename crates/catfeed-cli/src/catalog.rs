//! A catalog read from a JSON fixture file.
//!
//! ```json
//! {
//!   "currency": "EUR",
//!   "categories": [
//!     { "id": "root" },
//!     { "id": "sale", "parent_id": "root", "stream_id": "s-sale" }
//!   ],
//!   "streams": [
//!     { "id": "s-sale", "rule": { "tag": "sale", "max_gross": "20.00" } }
//!   ],
//!   "products": [ ... ]
//! }
//! ```
//!
//! Every condition set on a stream rule must hold. A rule without
//! conditions matches every product.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use catfeed_core::{CategoryId, CategoryStreamBinding, Product, ProductId, StreamId};
use catfeed_export::{CatalogEngine, CatalogError, ProductCriteria};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct FixtureCategory {
    id: CategoryId,
    #[serde(default)]
    parent_id: Option<CategoryId>,
    #[serde(default)]
    stream_id: Option<StreamId>,
}

#[derive(Debug, Deserialize)]
struct PropertyRule {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct StreamRule {
    #[serde(default)]
    product_ids: Vec<ProductId>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    property: Option<PropertyRule>,
    #[serde(default)]
    min_gross: Option<Decimal>,
    #[serde(default)]
    max_gross: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct FixtureStream {
    id: StreamId,
    #[serde(default)]
    rule: StreamRule,
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    categories: Vec<FixtureCategory>,
    #[serde(default)]
    streams: Vec<FixtureStream>,
    products: Vec<Product>,
}

pub struct FixtureCatalog {
    currency: String,
    categories: HashMap<CategoryId, FixtureCategory>,
    streams: HashMap<StreamId, StreamRule>,
    products: Vec<Product>,
}

impl FixtureCatalog {
    /// Reads and validates a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// category references an unknown stream or parent.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog fixture {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("invalid catalog fixture {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if `json` is malformed or references unknown ids.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let file: FixtureFile = serde_json::from_str(json)?;

        let streams: HashMap<StreamId, StreamRule> =
            file.streams.into_iter().map(|s| (s.id, s.rule)).collect();
        let categories: HashMap<CategoryId, FixtureCategory> = file
            .categories
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        for category in categories.values() {
            if let Some(stream_id) = &category.stream_id {
                anyhow::ensure!(
                    streams.contains_key(stream_id),
                    "category '{}' references unknown stream '{stream_id}'",
                    category.id
                );
            }
            if let Some(parent_id) = &category.parent_id {
                anyhow::ensure!(
                    categories.contains_key(parent_id),
                    "category '{}' references unknown parent '{parent_id}'",
                    category.id
                );
            }
        }

        let mut seen = HashSet::new();
        for product in &file.products {
            anyhow::ensure!(
                seen.insert(&product.id),
                "product '{}' is listed twice",
                product.id
            );
        }

        Ok(Self {
            currency: file.currency,
            categories,
            streams,
            products: file.products,
        })
    }

    /// Whether `root` is `category` itself or one of its ancestors.
    fn is_below(&self, category: &FixtureCategory, root: &CategoryId) -> bool {
        let mut current = Some(&category.id);
        let mut hops = 0;
        while let Some(id) = current {
            if id == root {
                return true;
            }
            // Guards against parent cycles in hand-written fixtures.
            hops += 1;
            if hops > self.categories.len() {
                return false;
            }
            current = self.categories.get(id).and_then(|c| c.parent_id.as_ref());
        }
        false
    }

    fn rule_matches(&self, rule: &StreamRule, product: &Product) -> bool {
        if !rule.product_ids.is_empty() && !rule.product_ids.contains(&product.id) {
            return false;
        }
        if let Some(tag) = &rule.tag {
            if !product.tags.contains(tag) {
                return false;
            }
        }
        if let Some(property) = &rule.property {
            let has_value = product
                .properties
                .get(&property.name)
                .is_some_and(|values| values.contains(&property.value));
            if !has_value {
                return false;
            }
        }
        if rule.min_gross.is_some() || rule.max_gross.is_some() {
            let Some(gross) = product.gross_in(&self.currency) else {
                return false;
            };
            if rule.min_gross.is_some_and(|min| gross < min)
                || rule.max_gross.is_some_and(|max| gross > max)
            {
                return false;
            }
        }
        true
    }

    fn matching(&self, criteria: &ProductCriteria) -> Vec<&Product> {
        let mut matching: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| criteria.matches(p))
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        matching
    }
}

#[async_trait]
impl CatalogEngine for FixtureCatalog {
    async fn category_bindings(
        &self,
        root: &CategoryId,
    ) -> Result<Vec<CategoryStreamBinding>, CatalogError> {
        if !self.categories.contains_key(root) {
            return Err(CatalogError::Query(format!(
                "navigation root '{root}' does not exist"
            )));
        }
        Ok(self
            .categories
            .values()
            .filter(|c| self.is_below(c, root))
            .filter_map(|c| {
                c.stream_id
                    .as_ref()
                    .map(|stream_id| CategoryStreamBinding {
                        category_id: c.id.clone(),
                        stream_id: stream_id.clone(),
                    })
            })
            .collect())
    }

    async fn resolve_stream(&self, stream_id: &StreamId) -> Result<Vec<ProductId>, CatalogError> {
        let rule = self
            .streams
            .get(stream_id)
            .ok_or_else(|| CatalogError::StreamNotFound {
                stream_id: stream_id.clone(),
            })?;
        Ok(self
            .products
            .iter()
            .filter(|p| self.rule_matches(rule, p))
            .map(|p| p.id.clone())
            .collect())
    }

    async fn search_products(
        &self,
        criteria: &ProductCriteria,
    ) -> Result<Vec<Product>, CatalogError> {
        let window = self
            .matching(criteria)
            .into_iter()
            .skip(criteria.offset)
            .cloned();
        Ok(match criteria.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    async fn count_products(&self, criteria: &ProductCriteria) -> Result<usize, CatalogError> {
        Ok(self.matching(criteria).len())
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}
