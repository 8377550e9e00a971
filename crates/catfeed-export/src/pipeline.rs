use catfeed_cache::AssignmentSnapshot;
use catfeed_core::{ShopConfig, VariantFamily};

use crate::adapter::{standard_adapters, AdapterContext, AdapterError, FieldAdapter};
use crate::variant::VariantResolver;
use crate::{ExportError, ExportItem, SkipReason, SkippedProduct};

/// Result of running one family through the pipeline.
#[derive(Debug)]
pub enum ItemOutcome {
    Exported(ExportItem),
    Skipped(SkippedProduct),
    /// The page must be aborted.
    Fatal(ExportError),
}

/// Turns a variant family into one feed record.
///
/// The main product is selected first, then every adapter fills its fields
/// in order. The first adapter that fails decides the outcome.
pub struct AdapterPipeline {
    resolver: VariantResolver,
    adapters: Vec<Box<dyn FieldAdapter>>,
}

impl AdapterPipeline {
    #[must_use]
    pub fn new(shop: &ShopConfig) -> Self {
        Self::with_adapters(VariantResolver::from_shop(shop), standard_adapters())
    }

    #[must_use]
    pub fn with_adapters(resolver: VariantResolver, adapters: Vec<Box<dyn FieldAdapter>>) -> Self {
        Self { resolver, adapters }
    }

    pub fn process(
        &self,
        family: &VariantFamily,
        shop: &ShopConfig,
        dynamic: &AssignmentSnapshot,
    ) -> ItemOutcome {
        let product = match self.resolver.select_main_product(family) {
            Ok(product) => product,
            Err(reason) => {
                tracing::warn!(
                    shopkey = %shop.shopkey,
                    product_id = %family.head.id,
                    policy = %shop.variant_policy,
                    reason = %reason,
                    "skipping variant family"
                );
                return ItemOutcome::Skipped(SkippedProduct {
                    product_id: family.head.id.clone(),
                    product_number: family.head.product_number.clone(),
                    reason,
                });
            }
        };

        let ctx = AdapterContext {
            product,
            family,
            shop,
            dynamic,
        };
        let mut item = ExportItem::new(product);

        for adapter in &self.adapters {
            let reason = match adapter.apply(&ctx, &mut item) {
                Ok(()) => continue,
                Err(AdapterError::Fatal(e)) => return ItemOutcome::Fatal(e),
                Err(AdapterError::Skip(reason)) => {
                    tracing::warn!(
                        shopkey = %shop.shopkey,
                        product_id = %product.id,
                        adapter = adapter.name(),
                        reason = %reason,
                        "skipping product"
                    );
                    reason
                }
                Err(AdapterError::Unexpected(message)) => {
                    tracing::error!(
                        shopkey = %shop.shopkey,
                        product_id = %product.id,
                        product_name = %product.name,
                        adapter = adapter.name(),
                        error = %message,
                        "adapter failed, skipping product"
                    );
                    SkipReason::Unexpected {
                        adapter: adapter.name().to_owned(),
                        message,
                    }
                }
            };
            return ItemOutcome::Skipped(SkippedProduct {
                product_id: product.id.clone(),
                product_number: product.product_number.clone(),
                reason,
            });
        }

        ItemOutcome::Exported(item)
    }
}
