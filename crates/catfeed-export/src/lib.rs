//! Paginated catalog export.
//!
//! One call to [`ExportRunner::export_page`] serves one page of family heads:
//! the [`ProductSearcher`] loads the families, the
//! [`DynamicProductGroupService`] supplies stream-bound categories from the
//! shared cache, and the [`AdapterPipeline`] turns every family into an
//! [`ExportItem`] or a skip entry.

pub mod adapter;
pub mod catalog;
pub mod dynamic_groups;
pub mod error;
pub mod item;
pub mod pagination;
pub mod pipeline;
pub mod price;
pub mod runner;
pub mod search;
pub mod variant;

pub use adapter::{AdapterContext, AdapterError, FieldAdapter};
pub use catalog::{CatalogEngine, ProductCriteria, ProductFilter};
pub use dynamic_groups::DynamicProductGroupService;
pub use error::{CatalogError, ExportError, SkipReason, SkippedProduct};
pub use item::ExportItem;
pub use pagination::{page_offsets, ExportPage, PageRequest};
pub use pipeline::{AdapterPipeline, ItemOutcome};
pub use price::{round_price, PriceRecord, PriceResolver};
pub use runner::ExportRunner;
pub use search::{ProductSearcher, SearchPage};
pub use variant::VariantResolver;
