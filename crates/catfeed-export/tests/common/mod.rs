//! In-memory catalog with call counters shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use catfeed_core::{
    AdvancedPricingMode, CategoryId, CategoryStreamBinding, CurrencyPrice, Product, ProductId,
    ShopConfig, StreamId, VariantPolicy,
};
use catfeed_export::{CatalogEngine, CatalogError, ProductCriteria};
use rust_decimal::Decimal;

pub const SHOPKEY: &str = "ABCDEF0123456789ABCDEF0123456789";
pub const OTHER_SHOPKEY: &str = "0123456789ABCDEF0123456789ABCDEF";

#[derive(Default)]
pub struct CountingCatalog {
    pub products: Vec<Product>,
    pub bindings: Vec<CategoryStreamBinding>,
    pub streams: HashMap<StreamId, Vec<ProductId>>,
    /// Streams that fail to resolve.
    pub broken_streams: Vec<StreamId>,
    pub binding_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl CountingCatalog {
    pub fn bind(mut self, category: &str, stream: &str, products: &[&str]) -> Self {
        self.bindings
            .push(CategoryStreamBinding::new(category, stream));
        self.streams.insert(
            StreamId::new(stream),
            products.iter().map(|p| ProductId::new(*p)).collect(),
        );
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Catalog calls made for dynamic-category resolution.
    pub fn dynamic_calls(&self) -> usize {
        self.binding_calls.load(Ordering::SeqCst) + self.stream_calls.load(Ordering::SeqCst)
    }

    fn matching(&self, criteria: &ProductCriteria) -> Vec<Product> {
        let mut matching: Vec<Product> = self
            .products
            .iter()
            .filter(|p| criteria.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        matching
    }
}

#[async_trait]
impl CatalogEngine for CountingCatalog {
    async fn category_bindings(
        &self,
        _root: &CategoryId,
    ) -> Result<Vec<CategoryStreamBinding>, CatalogError> {
        self.binding_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bindings.clone())
    }

    async fn resolve_stream(&self, stream_id: &StreamId) -> Result<Vec<ProductId>, CatalogError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_streams.contains(stream_id) {
            return Err(CatalogError::Query(format!("stream {stream_id} failed")));
        }
        self.streams
            .get(stream_id)
            .cloned()
            .ok_or_else(|| CatalogError::StreamNotFound {
                stream_id: stream_id.clone(),
            })
    }

    async fn search_products(
        &self,
        criteria: &ProductCriteria,
    ) -> Result<Vec<Product>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let matching = self.matching(criteria);
        let window = matching.into_iter().skip(criteria.offset);
        Ok(match criteria.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    async fn count_products(&self, criteria: &ProductCriteria) -> Result<usize, CatalogError> {
        Ok(self.matching(criteria).len())
    }
}

pub fn product(id: &str, parent: Option<&str>, gross: &str) -> Product {
    let gross: Decimal = gross.parse().expect("test price");
    Product {
        id: ProductId::new(id),
        parent_id: parent.map(ProductId::new),
        product_number: format!("SW-{id}"),
        name: format!("Product {id}"),
        prices: vec![CurrencyPrice::new("EUR", gross, gross)],
        tiers: vec![],
        category_ids: vec![],
        active: true,
        visible: true,
        available_stock: 10,
        tags: vec![],
        properties: BTreeMap::new(),
        seo_path: None,
        main_variant_id: None,
    }
}

pub fn shop(shopkey: &str) -> ShopConfig {
    ShopConfig {
        shopkey: shopkey.to_string(),
        shop_url: "https://shop.example".to_string(),
        navigation_root: CategoryId::new("root"),
        currency: "EUR".to_string(),
        variant_policy: VariantPolicy::HostDefault,
        advanced_pricing: AdvancedPricingMode::Off,
        hide_out_of_stock: false,
        default_display_gross: true,
        customer_groups: vec![],
    }
}
