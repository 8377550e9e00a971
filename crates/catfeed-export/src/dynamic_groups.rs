//! Stream-bound ("dynamic") category resolution shared across page requests.
//!
//! The bound categories below the navigation root, ordered by category id,
//! are cut into slices of `page_size`. Each slice's inverse mapping
//! (product -> categories) is cached as one snapshot. A request merges every
//! slice, computing and caching only those that are missing, so the whole
//! dataset is built once per TTL window no matter how many pages are served.

use std::sync::Arc;

use catfeed_cache::{slice_offsets, AssignmentSnapshot, DynamicGroupCache, WarmEvent, WarmState};
use catfeed_core::{CategoryId, CategoryStreamBinding, ProductId};
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::{CatalogEngine, ExportError};

/// Stream queries of one slice that may be in flight at once.
const MAX_CONCURRENT_STREAM_QUERIES: usize = 8;

/// Built per page request; holds no state of its own beyond the cache handle.
pub struct DynamicProductGroupService {
    catalog: Arc<dyn CatalogEngine>,
    cache: DynamicGroupCache,
    navigation_root: CategoryId,
}

impl DynamicProductGroupService {
    pub fn new(
        catalog: Arc<dyn CatalogEngine>,
        cache: DynamicGroupCache,
        navigation_root: CategoryId,
    ) -> Self {
        Self {
            catalog,
            cache,
            navigation_root,
        }
    }

    /// Whether every page of the current cycle has been served.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Cache`] if the cache is unreachable.
    pub async fn is_warmed_up(&self) -> Result<bool, ExportError> {
        Ok(self.cache.state().await?.is_warm())
    }

    /// Dynamic category ids of `product_ids`, for the product page at
    /// `(offset, page_size)` out of `catalog_total` products.
    ///
    /// Products matched by no stream are absent from the result. A catalog
    /// failure aborts before anything is written to the cache. On success the
    /// page counts towards warm-up.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the catalog or the cache fails.
    pub async fn resolve_categories(
        &self,
        offset: usize,
        page_size: usize,
        catalog_total: usize,
        product_ids: &[ProductId],
    ) -> Result<AssignmentSnapshot, ExportError> {
        let state = self.cache.state().await?;
        let (total, merged) = self.assignments(state, page_size).await?;

        let state = self
            .cache
            .advance(state, WarmEvent::TotalDiscovered(total))
            .await?;
        self.cache
            .advance(
                state,
                WarmEvent::PageCompleted {
                    offset,
                    page_size,
                    catalog_total,
                },
            )
            .await?;

        Ok(merged.restrict_to(product_ids))
    }

    /// Like [`Self::resolve_categories`], but outside of any page: missing
    /// snapshots are still computed and cached, while the total marker and
    /// the warm-up flag are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the catalog or the cache fails.
    pub async fn lookup_categories(
        &self,
        page_size: usize,
        product_ids: &[ProductId],
    ) -> Result<AssignmentSnapshot, ExportError> {
        let state = self.cache.state().await?;
        let (_, merged) = self.assignments(state, page_size).await?;
        Ok(merged.restrict_to(product_ids))
    }

    /// Merges every slice, computing and storing the missing ones. Returns
    /// the category total the slices were cut from.
    async fn assignments(
        &self,
        state: WarmState,
        page_size: usize,
    ) -> Result<(usize, AssignmentSnapshot), ExportError> {
        let page_size = page_size.max(1);

        let mut bindings = None;
        let total = match state.total() {
            Some(total) => total,
            None => bindings.insert(self.load_bindings().await?).len(),
        };

        let mut merged = AssignmentSnapshot::new();
        let mut computed = Vec::new();
        for slice_offset in slice_offsets(total, page_size) {
            if let Some(snapshot) = self.cache.snapshot(slice_offset).await? {
                merged.merge(&snapshot);
                continue;
            }
            if bindings.is_none() {
                bindings = Some(self.load_bindings().await?);
            }
            let slice = self
                .compute_slice(bindings.as_deref().unwrap_or(&[]), slice_offset, page_size)
                .await?;
            merged.merge(&slice);
            computed.push((slice_offset, slice));
        }

        for (slice_offset, snapshot) in &computed {
            self.cache.store_snapshot(*slice_offset, snapshot).await?;
        }
        if !computed.is_empty() {
            tracing::debug!(
                shopkey = self.cache.shopkey(),
                slices = computed.len(),
                total,
                "computed dynamic group slices"
            );
        }
        Ok((total, merged))
    }

    async fn load_bindings(&self) -> Result<Vec<CategoryStreamBinding>, ExportError> {
        let mut bindings = self
            .catalog
            .category_bindings(&self.navigation_root)
            .await?;
        bindings.sort_by(|a, b| {
            a.category_id
                .cmp(&b.category_id)
                .then_with(|| a.stream_id.cmp(&b.stream_id))
        });
        Ok(bindings)
    }

    /// Inverse mapping of the bindings in `[offset, offset + page_size)`.
    async fn compute_slice(
        &self,
        bindings: &[CategoryStreamBinding],
        offset: usize,
        page_size: usize,
    ) -> Result<AssignmentSnapshot, ExportError> {
        let slice: Vec<&CategoryStreamBinding> =
            bindings.iter().skip(offset).take(page_size).collect();
        let matches: Vec<Vec<ProductId>> = stream::iter(&slice)
            .map(|binding| self.catalog.resolve_stream(&binding.stream_id))
            .buffered(MAX_CONCURRENT_STREAM_QUERIES)
            .try_collect()
            .await?;

        let mut snapshot = AssignmentSnapshot::new();
        for (binding, product_ids) in slice.into_iter().zip(matches) {
            for product_id in product_ids {
                snapshot.assign(product_id, binding.category_id.clone());
            }
        }
        Ok(snapshot)
    }
}
