//! The seam to the host catalog.

use async_trait::async_trait;
use catfeed_core::{CategoryId, CategoryStreamBinding, Product, ProductId, StreamId};

use crate::CatalogError;

/// Which products a catalog query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    /// Standalone products and variant family heads.
    FamilyHeads,
    /// Variants whose parent is one of the listed heads.
    ChildrenOf(Vec<ProductId>),
    /// Exactly the listed products, whatever their role.
    Ids(Vec<ProductId>),
}

/// A product query. Results are always ordered by product id, so an
/// `offset`/`limit` window is stable across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCriteria {
    pub filter: ProductFilter,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ProductCriteria {
    #[must_use]
    pub fn family_heads() -> Self {
        Self::unpaged(ProductFilter::FamilyHeads)
    }

    #[must_use]
    pub fn children_of(head_ids: Vec<ProductId>) -> Self {
        Self::unpaged(ProductFilter::ChildrenOf(head_ids))
    }

    #[must_use]
    pub fn ids(ids: Vec<ProductId>) -> Self {
        Self::unpaged(ProductFilter::Ids(ids))
    }

    #[must_use]
    pub fn paged(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    fn unpaged(filter: ProductFilter) -> Self {
        Self {
            filter,
            offset: 0,
            limit: None,
        }
    }

    /// Whether `product` passes the filter, ignoring the window.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match &self.filter {
            ProductFilter::FamilyHeads => product.is_family_head(),
            ProductFilter::ChildrenOf(heads) => product
                .parent_id
                .as_ref()
                .is_some_and(|parent| heads.contains(parent)),
            ProductFilter::Ids(ids) => ids.contains(&product.id),
        }
    }
}

/// Read access to the host catalog.
///
/// Implementations must be safe to call from many page requests at once.
#[async_trait]
pub trait CatalogEngine: Send + Sync {
    /// Categories below `root` that are bound to a product stream.
    async fn category_bindings(
        &self,
        root: &CategoryId,
    ) -> Result<Vec<CategoryStreamBinding>, CatalogError>;

    /// Ids of every product the stream currently matches.
    async fn resolve_stream(&self, stream_id: &StreamId) -> Result<Vec<ProductId>, CatalogError>;

    async fn search_products(
        &self,
        criteria: &ProductCriteria,
    ) -> Result<Vec<Product>, CatalogError>;

    /// Number of products matching `criteria`, ignoring its window.
    async fn count_products(&self, criteria: &ProductCriteria) -> Result<usize, CatalogError>;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn make_product(id: &str, parent: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            parent_id: parent.map(ProductId::new),
            product_number: id.to_uppercase(),
            name: String::new(),
            prices: vec![],
            tiers: vec![],
            category_ids: vec![],
            active: true,
            visible: true,
            available_stock: 0,
            tags: vec![],
            properties: BTreeMap::new(),
            seo_path: None,
            main_variant_id: None,
        }
    }

    #[test]
    fn family_heads_excludes_variants() {
        let criteria = ProductCriteria::family_heads();
        assert!(criteria.matches(&make_product("a", None)));
        assert!(!criteria.matches(&make_product("b", Some("a"))));
    }

    #[test]
    fn children_of_matches_listed_parents_only() {
        let criteria = ProductCriteria::children_of(vec![ProductId::new("a")]);
        assert!(criteria.matches(&make_product("b", Some("a"))));
        assert!(!criteria.matches(&make_product("c", Some("z"))));
        assert!(!criteria.matches(&make_product("a", None)));
    }

    #[test]
    fn paged_sets_window() {
        let criteria = ProductCriteria::family_heads().paged(20, 10);
        assert_eq!(criteria.offset, 20);
        assert_eq!(criteria.limit, Some(10));
    }
}
