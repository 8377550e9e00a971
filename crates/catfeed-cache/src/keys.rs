//! Cache key layout for dynamic product groups.
//!
//! Every key embeds the shopkey so tenants never read each other's entries:
//!
//! ```text
//! fl_product_groups_{shopkey}_{offset}
//! fl_product_groups_{shopkey}_total
//! fl_product_groups_{shopkey}_dynamic_product_warmup
//! ```

const PREFIX: &str = "fl_product_groups";

#[must_use]
pub fn snapshot_key(shopkey: &str, offset: usize) -> String {
    format!("{PREFIX}_{shopkey}_{offset}")
}

#[must_use]
pub fn total_key(shopkey: &str) -> String {
    format!("{PREFIX}_{shopkey}_total")
}

#[must_use]
pub fn warmup_key(shopkey: &str) -> String {
    format!("{PREFIX}_{shopkey}_dynamic_product_warmup")
}
