//! Customer-group-aware price resolution.

use catfeed_core::{
    AdvancedPricingMode, CurrencyPrice, CustomerGroup, PriceTier, Product, ShopConfig,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::SkipReason;

/// One emitted price. `customer_group` is `None` for the currency default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRecord {
    pub customer_group: Option<String>,
    pub currency: String,
    pub amount: Decimal,
    pub display_gross: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<Decimal>,
}

/// Rounds half away from zero to two decimal places.
///
/// Applied exactly once, when a [`PriceRecord`] is built. Intermediate
/// comparisons always use full precision.
#[must_use]
pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone)]
pub struct PriceResolver {
    currency: String,
    default_display_gross: bool,
}

impl PriceResolver {
    pub fn new(currency: impl Into<String>, default_display_gross: bool) -> Self {
        Self {
            currency: currency.into(),
            default_display_gross,
        }
    }

    #[must_use]
    pub fn from_shop(shop: &ShopConfig) -> Self {
        Self::new(&shop.currency, shop.default_display_gross)
    }

    /// One record per customer group that has a price, followed by the
    /// currency-default record.
    ///
    /// A group whose rule matches a tier gets the tier picked by `mode`
    /// (ignored when `mode` is [`AdvancedPricingMode::Off`]); every other
    /// group gets the standard price. The default record always uses the
    /// standard price.
    ///
    /// # Errors
    ///
    /// Returns [`SkipReason::NoPrices`] if no record could be built.
    pub fn resolve_prices(
        &self,
        product: &Product,
        customer_groups: &[CustomerGroup],
        mode: AdvancedPricingMode,
    ) -> Result<Vec<PriceRecord>, SkipReason> {
        let standard = product.price_in(&self.currency);
        let mut records = Vec::with_capacity(customer_groups.len() + 1);

        for group in customer_groups {
            let price = self
                .tier_for(product, group, mode)
                .and_then(|tier| tier.price_in(&self.currency))
                .or(standard);
            if let Some(price) = price {
                records.push(self.emit(Some(&group.id), price, group.display_gross));
            }
        }

        if let Some(price) = standard {
            records.push(self.emit(None, price, self.default_display_gross));
        }

        if records.is_empty() {
            return Err(SkipReason::NoPrices {
                currency: self.currency.clone(),
            });
        }
        Ok(records)
    }

    fn tier_for<'a>(
        &self,
        product: &'a Product,
        group: &CustomerGroup,
        mode: AdvancedPricingMode,
    ) -> Option<&'a PriceTier> {
        let rule_id = group.rule_id.as_deref()?;
        let tiers = product
            .tiers
            .iter()
            .filter(|t| t.rule_id == rule_id && t.price_in(&self.currency).is_some());

        match mode {
            AdvancedPricingMode::Off => None,
            AdvancedPricingMode::Unit => tiers.min_by_key(|t| t.quantity_min),
            AdvancedPricingMode::Cheapest => {
                let amount = |tier: &PriceTier| {
                    tier.price_in(&self.currency)
                        .map(|p| p.amount(group.display_gross))
                };
                tiers.min_by(|a, b| amount(*a).cmp(&amount(*b)))
            }
        }
    }

    fn emit(&self, group: Option<&str>, price: &CurrencyPrice, display_gross: bool) -> PriceRecord {
        PriceRecord {
            customer_group: group.map(str::to_owned),
            currency: self.currency.clone(),
            amount: round_price(price.amount(display_gross)),
            display_gross,
            list_price: price.list_price.map(round_price),
        }
    }
}
