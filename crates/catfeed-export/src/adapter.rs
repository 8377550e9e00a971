//! Field adapters: each fills one part of an [`ExportItem`].
//!
//! Variants inherit what they leave empty from their family head: name,
//! storefront path, static categories, and properties.

use catfeed_cache::AssignmentSnapshot;
use catfeed_core::{CategoryId, Product, ShopConfig, VariantFamily};
use thiserror::Error;

use crate::price::PriceResolver;
use crate::{ExportError, ExportItem, SkipReason};

/// Everything an adapter may read while filling a record.
pub struct AdapterContext<'a> {
    /// The selected main product of the family.
    pub product: &'a Product,
    pub family: &'a VariantFamily,
    pub shop: &'a ShopConfig,
    /// Dynamic categories of the page's products.
    pub dynamic: &'a AssignmentSnapshot,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The product cannot be exported; the page continues.
    #[error("{0}")]
    Skip(SkipReason),

    /// An adapter failed in a way it did not anticipate; the product is
    /// skipped and the page continues.
    #[error("{0}")]
    Unexpected(String),

    /// The page cannot continue.
    #[error(transparent)]
    Fatal(#[from] ExportError),
}

impl From<SkipReason> for AdapterError {
    fn from(reason: SkipReason) -> Self {
        AdapterError::Skip(reason)
    }
}

pub trait FieldAdapter: Send + Sync {
    /// Short name used in logs and skip reports.
    fn name(&self) -> &'static str;

    /// Fills this adapter's fields of `item`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the field cannot be filled.
    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError>;
}

pub struct NameAdapter;

impl FieldAdapter for NameAdapter {
    fn name(&self) -> &'static str {
        "name"
    }

    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError> {
        let name = [ctx.product.name.trim(), ctx.family.head.name.trim()]
            .into_iter()
            .find(|n| !n.is_empty())
            .ok_or(SkipReason::MissingName)?;
        item.name = name.to_owned();
        Ok(())
    }
}

/// `{shop_url}/{seo_path}`, or `{shop_url}/detail/{id}` without a path.
pub struct UrlAdapter;

impl FieldAdapter for UrlAdapter {
    fn name(&self) -> &'static str {
        "url"
    }

    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError> {
        let base = ctx.shop.shop_url.trim_end_matches('/');
        let seo_path = ctx
            .product
            .seo_path
            .as_deref()
            .or(ctx.family.head.seo_path.as_deref())
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty());
        item.url = Some(match seo_path {
            Some(path) => format!("{base}/{path}"),
            None => format!("{base}/detail/{}", ctx.product.id),
        });
        Ok(())
    }
}

/// Static categories merged with the dynamic ones of the product and its
/// head, sorted and deduplicated.
pub struct CategoryAdapter;

impl FieldAdapter for CategoryAdapter {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError> {
        let static_ids = if ctx.product.category_ids.is_empty() {
            &ctx.family.head.category_ids
        } else {
            &ctx.product.category_ids
        };

        let mut categories: Vec<CategoryId> = static_ids
            .iter()
            .chain(ctx.dynamic.categories_for(&ctx.product.id))
            .chain(ctx.dynamic.categories_for(&ctx.family.head.id))
            .cloned()
            .collect();
        categories.sort();
        categories.dedup();

        if categories.is_empty() {
            return Err(SkipReason::NoCategories.into());
        }
        item.categories = categories;
        Ok(())
    }
}

pub struct PriceAdapter;

impl FieldAdapter for PriceAdapter {
    fn name(&self) -> &'static str {
        "price"
    }

    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError> {
        item.prices = PriceResolver::from_shop(ctx.shop).resolve_prices(
            ctx.product,
            &ctx.shop.customer_groups,
            ctx.shop.advanced_pricing,
        )?;
        Ok(())
    }
}

/// Properties of the head overlaid with the product's own, plus its tags.
pub struct AttributeAdapter;

impl FieldAdapter for AttributeAdapter {
    fn name(&self) -> &'static str {
        "attributes"
    }

    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError> {
        let mut attributes = ctx.family.head.properties.clone();
        for (name, values) in &ctx.product.properties {
            attributes.insert(name.clone(), values.clone());
        }
        let tags = if ctx.product.tags.is_empty() {
            &ctx.family.head.tags
        } else {
            &ctx.product.tags
        };
        if !tags.is_empty() {
            attributes.insert("tag".to_owned(), tags.clone());
        }
        for values in attributes.values_mut() {
            values.retain(|v| !v.trim().is_empty());
            values.sort();
            values.dedup();
        }
        attributes.retain(|_, values| !values.is_empty());
        item.attributes = attributes;
        Ok(())
    }
}

pub struct VariantAdapter;

impl FieldAdapter for VariantAdapter {
    fn name(&self) -> &'static str {
        "variants"
    }

    fn apply(&self, ctx: &AdapterContext<'_>, item: &mut ExportItem) -> Result<(), AdapterError> {
        item.variant_numbers = ctx.family.product_numbers();
        Ok(())
    }
}

/// The fixed adapter order of a feed record.
#[must_use]
pub fn standard_adapters() -> Vec<Box<dyn FieldAdapter>> {
    vec![
        Box::new(NameAdapter),
        Box::new(UrlAdapter),
        Box::new(CategoryAdapter),
        Box::new(PriceAdapter),
        Box::new(AttributeAdapter),
        Box::new(VariantAdapter),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use catfeed_core::{AdvancedPricingMode, CurrencyPrice, ProductId, VariantPolicy};
    use rust_decimal::Decimal;

    use super::*;

    fn make_product(id: &str, parent: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            parent_id: parent.map(ProductId::new),
            product_number: format!("SW-{id}"),
            name: String::new(),
            prices: vec![CurrencyPrice::new(
                "EUR",
                Decimal::new(840, 2),
                Decimal::new(1000, 2),
            )],
            tiers: vec![],
            category_ids: vec![],
            active: true,
            visible: true,
            available_stock: 1,
            tags: vec![],
            properties: BTreeMap::new(),
            seo_path: None,
            main_variant_id: None,
        }
    }

    fn make_shop() -> ShopConfig {
        ShopConfig {
            shopkey: "ABCDEF0123456789ABCDEF0123456789".to_string(),
            shop_url: "https://shop.example/".to_string(),
            navigation_root: CategoryId::new("root"),
            currency: "EUR".to_string(),
            variant_policy: VariantPolicy::HostDefault,
            advanced_pricing: AdvancedPricingMode::Off,
            hide_out_of_stock: false,
            default_display_gross: true,
            customer_groups: vec![],
        }
    }

    fn apply(
        adapter: &dyn FieldAdapter,
        family: &VariantFamily,
        product: &Product,
        dynamic: &AssignmentSnapshot,
    ) -> Result<ExportItem, AdapterError> {
        let shop = make_shop();
        let ctx = AdapterContext {
            product,
            family,
            shop: &shop,
            dynamic,
        };
        let mut item = ExportItem::new(product);
        adapter.apply(&ctx, &mut item)?;
        Ok(item)
    }

    #[test]
    fn variant_inherits_head_name() {
        let mut head = make_product("h", None);
        head.name = "  Linen Shirt ".to_string();
        let child = make_product("a", Some("h"));
        let family = VariantFamily::new(head, vec![child.clone()]);
        let item = apply(&NameAdapter, &family, &child, &AssignmentSnapshot::new()).unwrap();
        assert_eq!(item.name, "Linen Shirt");
    }

    #[test]
    fn missing_name_skips() {
        let head = make_product("h", None);
        let family = VariantFamily::new(head.clone(), vec![]);
        let err = apply(&NameAdapter, &family, &head, &AssignmentSnapshot::new()).unwrap_err();
        assert!(matches!(err, AdapterError::Skip(SkipReason::MissingName)));
    }

    #[test]
    fn url_uses_seo_path_or_detail_fallback() {
        let mut head = make_product("h", None);
        let family = VariantFamily::new(head.clone(), vec![]);
        let item = apply(&UrlAdapter, &family, &head, &AssignmentSnapshot::new()).unwrap();
        assert_eq!(item.url.as_deref(), Some("https://shop.example/detail/h"));

        head.seo_path = Some("/shirts/linen/".to_string());
        let family = VariantFamily::new(head.clone(), vec![]);
        let item = apply(&UrlAdapter, &family, &head, &AssignmentSnapshot::new()).unwrap();
        assert_eq!(item.url.as_deref(), Some("https://shop.example/shirts/linen"));
    }

    #[test]
    fn categories_merge_static_and_dynamic() {
        let mut head = make_product("h", None);
        head.category_ids = vec![CategoryId::new("static")];
        let family = VariantFamily::new(head.clone(), vec![]);
        let mut dynamic = AssignmentSnapshot::new();
        dynamic.assign(ProductId::new("h"), CategoryId::new("dyn"));
        dynamic.assign(ProductId::new("h"), CategoryId::new("static"));

        let item = apply(&CategoryAdapter, &family, &head, &dynamic).unwrap();
        assert_eq!(
            item.categories,
            vec![CategoryId::new("dyn"), CategoryId::new("static")]
        );
    }

    #[test]
    fn product_without_categories_skips() {
        let head = make_product("h", None);
        let family = VariantFamily::new(head.clone(), vec![]);
        let err = apply(&CategoryAdapter, &family, &head, &AssignmentSnapshot::new()).unwrap_err();
        assert!(matches!(err, AdapterError::Skip(SkipReason::NoCategories)));
    }

    #[test]
    fn attributes_overlay_variant_properties_and_tags() {
        let mut head = make_product("h", None);
        head.properties
            .insert("color".to_string(), vec!["red".to_string(), "blue".to_string()]);
        head.properties
            .insert("material".to_string(), vec!["linen".to_string()]);
        head.tags = vec!["summer".to_string()];
        let mut child = make_product("a", Some("h"));
        child
            .properties
            .insert("color".to_string(), vec!["red".to_string()]);
        let family = VariantFamily::new(head, vec![child.clone()]);

        let item = apply(&AttributeAdapter, &family, &child, &AssignmentSnapshot::new()).unwrap();
        assert_eq!(item.attributes["color"], vec!["red"]);
        assert_eq!(item.attributes["material"], vec!["linen"]);
        assert_eq!(item.attributes["tag"], vec!["summer"]);
    }

    #[test]
    fn variant_numbers_cover_the_family() {
        let head = make_product("h", None);
        let family = VariantFamily::new(
            head.clone(),
            vec![make_product("b", Some("h")), make_product("a", Some("h"))],
        );
        let item = apply(&VariantAdapter, &family, &head, &AssignmentSnapshot::new()).unwrap();
        assert_eq!(item.variant_numbers, vec!["SW-h", "SW-a", "SW-b"]);
    }
}
