//! Export command handlers.
//!
//! Pages are written to stdout as one JSON document per line; progress and
//! skips go to the log.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use catfeed_cache::MemoryCache;
use catfeed_core::{AppConfig, ProductId, ShopConfig};
use catfeed_export::{
    page_offsets, CatalogEngine, ExportPage, ExportRunner, ItemOutcome, PageRequest,
};
use futures::stream::{self, StreamExt};

use crate::catalog::FixtureCatalog;

/// Builds a runner for `shopkey` over the configured fixture catalog and a
/// fresh in-process cache.
pub(crate) fn build_runner(config: &AppConfig, shopkey: &str) -> anyhow::Result<ExportRunner> {
    let shops = catfeed_core::load_shops(&config.shops_path)?;
    let shop: ShopConfig = shops.find(shopkey).cloned().ok_or_else(|| {
        anyhow::anyhow!(
            "shop '{shopkey}' not found in {}",
            config.shops_path.display()
        )
    })?;
    let catalog: Arc<dyn CatalogEngine> = Arc::new(FixtureCatalog::load(&config.catalog_path)?);

    Ok(ExportRunner::new(
        catalog,
        Arc::new(MemoryCache::new()),
        shop,
        Duration::from_secs(config.cache_ttl_secs),
    ))
}

pub(crate) async fn run_export(
    config: &AppConfig,
    shopkey: &str,
    offset: usize,
    count: Option<usize>,
) -> anyhow::Result<()> {
    let runner = build_runner(config, shopkey)?;
    let request = PageRequest::new(
        offset,
        count.unwrap_or(config.default_page_size),
        config.max_page_size,
    )?;
    let page = runner.export_page(request).await?;
    write_page(&page)
}

/// Exports every page of the shop concurrently against one shared cache.
///
/// The first page runs alone so the remaining pages find the total marker
/// already set. If any page fails, the shop's cache is cleared before the
/// error is returned.
pub(crate) async fn run_export_all(
    config: &AppConfig,
    shopkey: &str,
    count: Option<usize>,
) -> anyhow::Result<()> {
    let runner = build_runner(config, shopkey)?;
    let page_size = PageRequest::new(
        0,
        count.unwrap_or(config.default_page_size),
        config.max_page_size,
    )?
    .count;

    let first = match runner.export_page(PageRequest::new(0, page_size, page_size)?).await {
        Ok(page) => page,
        Err(e) => {
            clear_cache_best_effort(&runner, page_size).await;
            return Err(e).context("export of first page failed");
        }
    };

    let offsets: Vec<usize> = page_offsets(first.total, page_size)
        .into_iter()
        .skip(1)
        .collect();
    let max_concurrent = config.max_concurrent_pages.max(1);
    tracing::info!(
        shopkey,
        total = first.total,
        pages = offsets.len() + 1,
        max_concurrent,
        "starting full export"
    );

    let results: Vec<(usize, anyhow::Result<ExportPage>)> = stream::iter(offsets)
        .map(|offset| {
            let runner = &runner;
            async move {
                let result = match PageRequest::new(offset, page_size, page_size) {
                    Ok(request) => runner
                        .export_page(request)
                        .await
                        .map_err(anyhow::Error::from),
                    Err(e) => Err(e.into()),
                };
                (offset, result)
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut pages = vec![first];
    let mut failed = 0_usize;
    for (offset, result) in results {
        match result {
            Ok(page) => pages.push(page),
            Err(e) => {
                tracing::error!(shopkey, offset, error = %e, "export page failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        clear_cache_best_effort(&runner, page_size).await;
        anyhow::bail!("{failed} page(s) failed for shop '{shopkey}'");
    }

    pages.sort_by_key(|p| p.offset);
    for page in &pages {
        write_page(page)?;
    }

    let exported: usize = pages.iter().map(|p| p.items.len()).sum();
    let skipped: usize = pages.iter().map(|p| p.skipped.len()).sum();
    let state = runner.cache_state().await?;
    tracing::info!(
        shopkey,
        pages = pages.len(),
        exported,
        skipped,
        warmed_up = state.is_warm(),
        "full export complete"
    );
    Ok(())
}

/// Prints the record of one product, or why it is not exported.
pub(crate) async fn run_debug(
    config: &AppConfig,
    shopkey: &str,
    product_id: &str,
) -> anyhow::Result<()> {
    let runner = build_runner(config, shopkey)?;
    let outcome = runner
        .export_product(&ProductId::new(product_id), config.default_page_size)
        .await?;

    match outcome {
        Some(ItemOutcome::Exported(item)) => {
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Some(ItemOutcome::Skipped(skipped)) => {
            println!(
                "product '{}' ({}) is not exported: {}",
                skipped.product_id, skipped.product_number, skipped.reason
            );
        }
        Some(ItemOutcome::Fatal(e)) => return Err(e.into()),
        None => anyhow::bail!("product '{product_id}' not found in catalog"),
    }
    Ok(())
}

async fn clear_cache_best_effort(runner: &ExportRunner, page_size: usize) {
    if let Err(e) = runner.clear_cache(page_size).await {
        tracing::error!(
            shopkey = %runner.shop().shopkey,
            error = %e,
            "failed to clear dynamic group cache after failed export"
        );
    }
}

fn write_page(page: &ExportPage) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, page)?;
    writeln!(stdout)?;
    Ok(())
}
