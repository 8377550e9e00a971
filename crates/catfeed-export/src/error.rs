use catfeed_cache::CacheError;
use catfeed_core::{ProductId, StreamId};
use serde::Serialize;
use thiserror::Error;

/// Failure reported by a [`crate::CatalogEngine`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("product stream {stream_id} not found")]
    StreamNotFound { stream_id: StreamId },

    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Errors that abort a whole page.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("invalid page request: {0}")]
    InvalidRequest(String),
}

/// Why a single product was left out of the feed. The rest of the page is
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("product has no name")]
    MissingName,

    #[error("product has no price in {currency}")]
    NoPrices { currency: String },

    #[error("product is not assigned to any category")]
    NoCategories,

    #[error("no member of the variant family is eligible for export")]
    NoEligibleVariant,

    #[error("unexpected error in {adapter} adapter: {message}")]
    Unexpected { adapter: String, message: String },
}

/// One entry of a page's skip report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProduct {
    pub product_id: ProductId,
    pub product_number: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}
