use std::collections::BTreeMap;

use catfeed_core::{CategoryId, Product, ProductId};
use serde::Serialize;

use crate::price::PriceRecord;

/// One flat record of the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportItem {
    pub id: ProductId,
    pub product_number: String,
    pub name: String,
    pub categories: Vec<CategoryId>,
    pub prices: Vec<PriceRecord>,
    pub attributes: BTreeMap<String, Vec<String>>,
    pub url: Option<String>,
    /// Product numbers of every member of the family, head first.
    pub variant_numbers: Vec<String>,
}

impl ExportItem {
    /// An empty record for `product`, ready for the adapters to fill.
    #[must_use]
    pub fn new(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            product_number: product.product_number.clone(),
            name: String::new(),
            categories: Vec::new(),
            prices: Vec::new(),
            attributes: BTreeMap::new(),
            url: None,
            variant_numbers: Vec::new(),
        }
    }
}
