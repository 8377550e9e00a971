//! Choice of the single exported member of a variant family.

use catfeed_core::{Product, ShopConfig, VariantFamily, VariantPolicy};
use rust_decimal::Decimal;

use crate::SkipReason;

/// Picks the main product of a family under one [`VariantPolicy`].
///
/// A member is *eligible* when it is active, visible, has a gross price
/// above zero in the export currency, and, if the shop hides out-of-stock
/// products, has stock. Only eligible members are ever selected.
#[derive(Debug, Clone)]
pub struct VariantResolver {
    policy: VariantPolicy,
    currency: String,
    hide_out_of_stock: bool,
}

impl VariantResolver {
    pub fn new(
        policy: VariantPolicy,
        currency: impl Into<String>,
        hide_out_of_stock: bool,
    ) -> Self {
        Self {
            policy,
            currency: currency.into(),
            hide_out_of_stock,
        }
    }

    #[must_use]
    pub fn from_shop(shop: &ShopConfig) -> Self {
        Self::new(shop.variant_policy, &shop.currency, shop.hide_out_of_stock)
    }

    /// Selects the member to export.
    ///
    /// The result depends only on the policy and the members' data; children
    /// are compared in id order regardless of how the catalog returned them.
    ///
    /// # Errors
    ///
    /// Returns [`SkipReason::NoEligibleVariant`] if the policy finds no
    /// eligible member.
    pub fn select_main_product<'a>(
        &self,
        family: &'a VariantFamily,
    ) -> Result<&'a Product, SkipReason> {
        let selected = match self.policy {
            VariantPolicy::HostDefault => self.host_default(family),
            VariantPolicy::MainParent => Some(&family.head).filter(|p| self.is_eligible(p)),
            VariantPolicy::Cheapest => self.cheapest(family),
        };
        selected.ok_or(SkipReason::NoEligibleVariant)
    }

    #[must_use]
    pub fn is_eligible(&self, product: &Product) -> bool {
        product.is_exportable()
            && (!self.hide_out_of_stock || product.is_in_stock())
            && self.gross(product).is_some()
    }

    /// Positive gross price in the export currency.
    fn gross(&self, product: &Product) -> Option<Decimal> {
        product
            .gross_in(&self.currency)
            .filter(|gross| *gross > Decimal::ZERO)
    }

    fn host_default<'a>(&self, family: &'a VariantFamily) -> Option<&'a Product> {
        family
            .head
            .main_variant_id
            .as_ref()
            .and_then(|id| family.member(id))
            .filter(|p| self.is_eligible(p))
            .or_else(|| family.members().find(|p| self.is_eligible(p)))
    }

    /// Strictly lower gross wins, so the head beats equally priced children
    /// and a lower child id beats an equally priced later child.
    fn cheapest<'a>(&self, family: &'a VariantFamily) -> Option<&'a Product> {
        let mut best: Option<(&Product, Decimal)> = None;
        for member in family.members().filter(|p| self.is_eligible(p)) {
            let Some(gross) = self.gross(member) else {
                continue;
            };
            if best.is_none_or(|(_, best_gross)| gross < best_gross) {
                best = Some((member, gross));
            }
        }
        best.map(|(product, _)| product)
    }
}
