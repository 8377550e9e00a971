//! Key-value caching for the catalog export.
//!
//! [`KeyValueCache`] is the store seam: get/set-with-TTL/delete over string
//! values. [`MemoryCache`] implements it in-process. [`DynamicGroupCache`]
//! layers the dynamic-category entries (per-offset snapshots, the total
//! marker, and the warm-up flag) on top of any store.

pub mod dynamic_groups;
pub mod error;
pub mod keys;
pub mod kv;

pub use dynamic_groups::{
    slice_offsets, AssignmentSnapshot, DynamicGroupCache, WarmEvent, WarmState, DEFAULT_TTL,
};
pub use error::CacheError;
pub use kv::{KeyValueCache, MemoryCache};
