use std::sync::Arc;
use std::time::Duration;

use catfeed_cache::{DynamicGroupCache, KeyValueCache, WarmState};
use catfeed_core::{ProductId, ShopConfig};
use chrono::Utc;

use crate::dynamic_groups::DynamicProductGroupService;
use crate::{
    AdapterPipeline, CatalogEngine, ExportError, ExportPage, ItemOutcome, PageRequest,
    ProductSearcher,
};

/// Serves export pages for one shop.
///
/// Holds no per-run state: every call reads what it needs from the catalog
/// and the shared cache, so any number of pages may run at once.
pub struct ExportRunner {
    catalog: Arc<dyn CatalogEngine>,
    store: Arc<dyn KeyValueCache>,
    shop: ShopConfig,
    ttl: Duration,
}

impl ExportRunner {
    pub fn new(
        catalog: Arc<dyn CatalogEngine>,
        store: Arc<dyn KeyValueCache>,
        shop: ShopConfig,
        ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            shop,
            ttl,
        }
    }

    #[must_use]
    pub fn shop(&self) -> &ShopConfig {
        &self.shop
    }

    /// Exports the family heads `[offset, offset + count)`.
    ///
    /// Products that cannot be exported are listed in
    /// [`ExportPage::skipped`]; the page itself still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the catalog or the cache fails, or an
    /// adapter reports a fatal error.
    pub async fn export_page(&self, request: PageRequest) -> Result<ExportPage, ExportError> {
        let searcher = ProductSearcher::new(Arc::clone(&self.catalog));
        let page = searcher.search_page(request.offset, request.count).await?;

        let dynamic = self
            .group_service()
            .resolve_categories(
                request.offset,
                request.count,
                page.total,
                &page.product_ids(),
            )
            .await?;

        let pipeline = AdapterPipeline::new(&self.shop);
        let mut items = Vec::with_capacity(page.families.len());
        let mut skipped = Vec::new();
        for family in &page.families {
            match pipeline.process(family, &self.shop, &dynamic) {
                ItemOutcome::Exported(item) => items.push(item),
                ItemOutcome::Skipped(entry) => skipped.push(entry),
                ItemOutcome::Fatal(e) => return Err(e),
            }
        }

        tracing::info!(
            shopkey = %self.shop.shopkey,
            offset = request.offset,
            count = request.count,
            exported = items.len(),
            skipped = skipped.len(),
            "export page complete"
        );

        Ok(ExportPage {
            offset: request.offset,
            page_size: request.count,
            total: page.total,
            next_offset: ExportPage::next_offset(request.offset, request.count, page.total),
            items,
            skipped,
            generated_at: Utc::now(),
        })
    }

    /// Exports the single family containing `product_id`, for diagnosing
    /// why a product is missing from the feed.
    ///
    /// `page_size` must match the page size of the regular run so the
    /// cached dynamic-category slices are reused. The lookup does not count
    /// as a served page, so the warm-up state is left as it was. Returns
    /// `None` if the catalog does not know the product. Never returns
    /// [`ItemOutcome::Fatal`]; fatal errors are returned as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the catalog or the cache fails.
    pub async fn export_product(
        &self,
        product_id: &ProductId,
        page_size: usize,
    ) -> Result<Option<ItemOutcome>, ExportError> {
        let searcher = ProductSearcher::new(Arc::clone(&self.catalog));
        let Some(family) = searcher.find_family(product_id).await? else {
            return Ok(None);
        };

        let ids: Vec<ProductId> = family.members().map(|p| p.id.clone()).collect();
        let dynamic = self
            .group_service()
            .lookup_categories(page_size, &ids)
            .await?;

        match AdapterPipeline::new(&self.shop).process(&family, &self.shop, &dynamic) {
            ItemOutcome::Fatal(e) => Err(e),
            outcome => Ok(Some(outcome)),
        }
    }

    /// Current warm-up state of the shop's dynamic-category cache.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Cache`] if the cache is unreachable.
    pub async fn cache_state(&self) -> Result<WarmState, ExportError> {
        Ok(self.group_cache().state().await?)
    }

    /// Evicts the shop's dynamic-category cache.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Cache`] if the cache is unreachable.
    pub async fn clear_cache(&self, page_size: usize) -> Result<(), ExportError> {
        Ok(self.group_cache().clear(page_size).await?)
    }

    fn group_cache(&self) -> DynamicGroupCache {
        DynamicGroupCache::new(Arc::clone(&self.store), &self.shop.shopkey, self.ttl)
    }

    fn group_service(&self) -> DynamicProductGroupService {
        DynamicProductGroupService::new(
            Arc::clone(&self.catalog),
            self.group_cache(),
            self.shop.navigation_root.clone(),
        )
    }
}
