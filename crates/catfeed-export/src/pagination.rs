//! Page windows over the family heads of a catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ExportError, ExportItem, SkippedProduct};

/// A validated `(offset, count)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub count: usize,
}

impl PageRequest {
    /// Validates `count` and clamps it to `max_count`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidRequest`] if `count` is zero.
    pub fn new(offset: usize, count: usize, max_count: usize) -> Result<Self, ExportError> {
        if count == 0 {
            return Err(ExportError::InvalidRequest(
                "count must be at least 1".to_string(),
            ));
        }
        let clamped = count.min(max_count.max(1));
        if clamped < count {
            tracing::debug!(requested = count, clamped, "page size clamped to maximum");
        }
        Ok(Self {
            offset,
            count: clamped,
        })
    }
}

/// One served page of the feed.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPage {
    pub offset: usize,
    pub page_size: usize,
    /// Family heads in the whole catalog.
    pub total: usize,
    /// Offset of the following page, `None` on the last one.
    pub next_offset: Option<usize>,
    pub items: Vec<ExportItem>,
    pub skipped: Vec<SkippedProduct>,
    pub generated_at: DateTime<Utc>,
}

impl ExportPage {
    #[must_use]
    pub fn next_offset(offset: usize, page_size: usize, total: usize) -> Option<usize> {
        let next = offset.saturating_add(page_size);
        (next < total).then_some(next)
    }
}

/// Every page offset needed to cover `total` heads.
#[must_use]
pub fn page_offsets(total: usize, page_size: usize) -> Vec<usize> {
    (0..total).step_by(page_size.max(1)).collect()
}
