//! Cache entries backing dynamic (stream-bound) category resolution.
//!
//! Three kinds of entries live under one shopkey:
//!
//! - one [`AssignmentSnapshot`] per slice offset,
//! - the total number of stream-bound categories,
//! - the warm-up flag.
//!
//! The total and the flag together form a small state machine
//! ([`WarmState`]). It is read through [`DynamicGroupCache::state`] and only
//! ever advanced through [`DynamicGroupCache::advance`], so no caller writes
//! the markers directly.
//!
//! The total counts categories and only decides how snapshots are sliced.
//! Warm-up is decided against the number of products the export pages
//! through, which every [`WarmEvent::PageCompleted`] carries.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use catfeed_core::{CategoryId, ProductId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::keys::{snapshot_key, total_key, warmup_key};
use crate::{CacheError, KeyValueCache};

/// Lifetime of every entry, refreshed whenever the entry is read.
pub const DEFAULT_TTL: Duration = Duration::from_secs(660);

/// Dynamic category ids per product, computed for one slice of the
/// stream-bound categories.
///
/// Category lists are kept sorted and free of duplicates so that equal
/// catalog state always serializes to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentSnapshot(BTreeMap<ProductId, Vec<CategoryId>>);

impl AssignmentSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, product_id: ProductId, category_id: CategoryId) {
        let categories = self.0.entry(product_id).or_default();
        if let Err(pos) = categories.binary_search(&category_id) {
            categories.insert(pos, category_id);
        }
    }

    /// Empty when the product matched none of the slice's streams.
    #[must_use]
    pub fn categories_for(&self, product_id: &ProductId) -> &[CategoryId] {
        self.0.get(product_id).map_or(&[], Vec::as_slice)
    }

    pub fn merge(&mut self, other: &AssignmentSnapshot) {
        for (product_id, categories) in &other.0 {
            for category_id in categories {
                self.assign(product_id.clone(), category_id.clone());
            }
        }
    }

    /// A copy holding only the listed products.
    #[must_use]
    pub fn restrict_to(&self, product_ids: &[ProductId]) -> AssignmentSnapshot {
        let mut restricted = AssignmentSnapshot::new();
        for product_id in product_ids {
            if let Some(categories) = self.0.get(product_id) {
                restricted.0.insert(product_id.clone(), categories.clone());
            }
        }
        restricted
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &[CategoryId])> {
        self.0.iter().map(|(p, c)| (p, c.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How much of a shopkey's dynamic-category dataset is cached.
///
/// `total` is the number of stream-bound categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmState {
    /// No total marker: nothing about this run is known yet.
    Cold,
    /// The total is fixed for this TTL window but the last page has not
    /// been served.
    PartiallyWarm { total: usize },
    /// Every page of the run has been served at least once.
    Warm { total: usize },
}

impl WarmState {
    #[must_use]
    pub fn total(self) -> Option<usize> {
        match self {
            WarmState::Cold => None,
            WarmState::PartiallyWarm { total } | WarmState::Warm { total } => Some(total),
        }
    }

    #[must_use]
    pub fn is_warm(self) -> bool {
        matches!(self, WarmState::Warm { .. })
    }

    /// Pure transition function. Returns the next state and the marker write
    /// needed to persist it, if any.
    fn next(self, event: WarmEvent) -> (WarmState, Option<MarkerWrite>) {
        match (self, event) {
            (WarmState::Cold, WarmEvent::TotalDiscovered(total)) => (
                WarmState::PartiallyWarm { total },
                Some(MarkerWrite::Total(total)),
            ),
            (
                WarmState::PartiallyWarm { total },
                WarmEvent::PageCompleted {
                    offset,
                    page_size,
                    catalog_total,
                },
            ) if offset.saturating_add(page_size) >= catalog_total => {
                (WarmState::Warm { total }, Some(MarkerWrite::WarmUp))
            }
            (state, _) => (state, None),
        }
    }
}

/// Input to the warm-up state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmEvent {
    /// The number of stream-bound categories was counted. Ignored unless the
    /// state is [`WarmState::Cold`]: an existing total is authoritative.
    TotalDiscovered(usize),
    /// The product page `[offset, offset + page_size)` out of
    /// `catalog_total` exportable products was fully served.
    PageCompleted {
        offset: usize,
        page_size: usize,
        catalog_total: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerWrite {
    Total(usize),
    WarmUp,
}

/// Offsets of every slice of `total` categories cut into `page_size` pieces.
pub fn slice_offsets(total: usize, page_size: usize) -> impl Iterator<Item = usize> {
    (0..total).step_by(page_size.max(1))
}

/// Typed access to one shopkey's dynamic-category cache entries.
#[derive(Clone)]
pub struct DynamicGroupCache {
    store: Arc<dyn KeyValueCache>,
    shopkey: String,
    ttl: Duration,
}

impl DynamicGroupCache {
    pub fn new(store: Arc<dyn KeyValueCache>, shopkey: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            shopkey: shopkey.into(),
            ttl,
        }
    }

    #[must_use]
    pub fn shopkey(&self) -> &str {
        &self.shopkey
    }

    /// Reads the warm-up markers, sliding their TTL.
    ///
    /// A warm-up flag without a total reads as [`WarmState::Cold`]: the total
    /// has expired and has to be rediscovered before anything is trusted.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store is unreachable.
    pub async fn state(&self) -> Result<WarmState, CacheError> {
        let Some(total) = self.read::<usize>(&total_key(&self.shopkey)).await? else {
            return Ok(WarmState::Cold);
        };
        let warm = self
            .read::<bool>(&warmup_key(&self.shopkey))
            .await?
            .unwrap_or(false);
        Ok(if warm {
            WarmState::Warm { total }
        } else {
            WarmState::PartiallyWarm { total }
        })
    }

    /// Applies `event` to `state` and persists the resulting marker, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the marker cannot be written.
    pub async fn advance(
        &self,
        state: WarmState,
        event: WarmEvent,
    ) -> Result<WarmState, CacheError> {
        let (next, write) = state.next(event);
        match write {
            Some(MarkerWrite::Total(total)) => {
                self.write(&total_key(&self.shopkey), &total).await?;
                tracing::debug!(shopkey = %self.shopkey, total, "stored dynamic group total");
            }
            Some(MarkerWrite::WarmUp) => {
                self.write(&warmup_key(&self.shopkey), &true).await?;
                tracing::info!(
                    shopkey = %self.shopkey,
                    total = next.total().unwrap_or_default(),
                    "dynamic product groups warmed up"
                );
            }
            None => {}
        }
        Ok(next)
    }

    /// Reads the snapshot cached for `offset`, sliding its TTL on a hit.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store is unreachable.
    pub async fn snapshot(&self, offset: usize) -> Result<Option<AssignmentSnapshot>, CacheError> {
        let snapshot = self.read(&snapshot_key(&self.shopkey, offset)).await?;
        if snapshot.is_some() {
            tracing::debug!(shopkey = %self.shopkey, offset, "dynamic group snapshot hit");
        } else {
            tracing::debug!(shopkey = %self.shopkey, offset, "dynamic group snapshot miss");
        }
        Ok(snapshot)
    }

    /// Replaces the snapshot for `offset` as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the snapshot cannot be encoded or written.
    pub async fn store_snapshot(
        &self,
        offset: usize,
        snapshot: &AssignmentSnapshot,
    ) -> Result<(), CacheError> {
        self.write(&snapshot_key(&self.shopkey, offset), snapshot)
            .await
    }

    /// Evicts the markers and every snapshot of the current cycle.
    ///
    /// Snapshots are enumerated from the cached total, so `page_size` must be
    /// the page size the run used. Snapshots left behind by a different page
    /// size expire on their own.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store is unreachable.
    pub async fn clear(&self, page_size: usize) -> Result<(), CacheError> {
        let total_key = total_key(&self.shopkey);
        // An undecodable total is logged and dropped by `read`; its snapshots
        // then expire on their own.
        let total = self.read::<usize>(&total_key).await?.unwrap_or(0);
        for offset in slice_offsets(total, page_size) {
            self.store
                .delete(&snapshot_key(&self.shopkey, offset))
                .await?;
        }
        self.store.delete(&total_key).await?;
        self.store.delete(&warmup_key(&self.shopkey)).await?;
        tracing::info!(shopkey = %self.shopkey, total, "cleared dynamic product group cache");
        Ok(())
    }

    /// Reads and decodes `key`, re-storing it to slide its TTL.
    ///
    /// An undecodable entry is dropped and reported as a miss.
    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                self.store.set(key, raw, self.ttl).await?;
                Ok(Some(value))
            }
            Err(source) => {
                let err = CacheError::Decode {
                    key: key.to_owned(),
                    source,
                };
                tracing::warn!(error = %err, "dropping undecodable cache entry");
                self.store.delete(key).await?;
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|source| CacheError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.store.set(key, raw, self.ttl).await
    }
}
