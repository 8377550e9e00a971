use std::collections::HashMap;
use std::sync::Arc;

use catfeed_core::{Product, ProductId, VariantFamily};

use crate::{CatalogEngine, CatalogError, ProductCriteria};

/// One window of family heads with their variants loaded.
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Number of family heads in the whole catalog.
    pub total: usize,
    pub families: Vec<VariantFamily>,
}

impl SearchPage {
    /// Ids of every head and variant on the page.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.families
            .iter()
            .flat_map(|family| family.members())
            .map(|p| p.id.clone())
            .collect()
    }
}

/// Loads pages of variant families from the catalog.
pub struct ProductSearcher {
    catalog: Arc<dyn CatalogEngine>,
}

impl ProductSearcher {
    pub fn new(catalog: Arc<dyn CatalogEngine>) -> Self {
        Self { catalog }
    }

    /// Family heads `[offset, offset + count)` in id order, each with all of
    /// its variants. Costs three catalog calls regardless of page size.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any catalog call fails.
    pub async fn search_page(
        &self,
        offset: usize,
        count: usize,
    ) -> Result<SearchPage, CatalogError> {
        let total = self
            .catalog
            .count_products(&ProductCriteria::family_heads())
            .await?;
        let heads = self
            .catalog
            .search_products(&ProductCriteria::family_heads().paged(offset, count))
            .await?;
        let families = self.attach_children(heads).await?;
        Ok(SearchPage { total, families })
    }

    /// The family containing `id`, whether `id` names a head or a variant.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any catalog call fails.
    pub async fn find_family(&self, id: &ProductId) -> Result<Option<VariantFamily>, CatalogError> {
        let Some(product) = self.find_one(id).await? else {
            return Ok(None);
        };
        let head = match &product.parent_id {
            None => product,
            Some(parent_id) => match self.find_one(parent_id).await? {
                Some(head) => head,
                None => {
                    tracing::warn!(
                        product_id = %id,
                        parent_id = %parent_id,
                        "variant has no parent in catalog"
                    );
                    return Ok(None);
                }
            },
        };
        Ok(self.attach_children(vec![head]).await?.pop())
    }

    async fn find_one(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut found = self
            .catalog
            .search_products(&ProductCriteria::ids(vec![id.clone()]))
            .await?;
        Ok(found.pop())
    }

    async fn attach_children(
        &self,
        heads: Vec<Product>,
    ) -> Result<Vec<VariantFamily>, CatalogError> {
        if heads.is_empty() {
            return Ok(Vec::new());
        }
        let head_ids = heads.iter().map(|h| h.id.clone()).collect();
        let children = self
            .catalog
            .search_products(&ProductCriteria::children_of(head_ids))
            .await?;

        let mut by_parent: HashMap<ProductId, Vec<Product>> = HashMap::new();
        for child in children {
            if let Some(parent_id) = child.parent_id.clone() {
                by_parent.entry(parent_id).or_default().push(child);
            }
        }

        Ok(heads
            .into_iter()
            .map(|head| {
                let children = by_parent.remove(&head.id).unwrap_or_default();
                VariantFamily::new(head, children)
            })
            .collect())
    }
}
