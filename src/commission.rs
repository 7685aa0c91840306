//! Commission rate resolution. Pure lookups over already-loaded reference
//! data; a missing or unknown category falls back to the platform default
//! and must never fail the order.

use rust_decimal::Decimal;

use crate::config::PlatformSettings;
use crate::domain::{LedgerStore, Order, OwnerType};

/// Applicable commission rate for an order, as a percentage (0-100).
///
/// Resellers get the flat reseller rate; everyone else gets the rate
/// configured for the order's category, or the platform default when the
/// category has no rule.
pub fn resolve_rate<S: LedgerStore>(
    order: &Order,
    owner_type: OwnerType,
    store: &S,
    settings: &PlatformSettings,
) -> Decimal {
    match owner_type {
        OwnerType::Reseller => settings.reseller_commission_percent,
        OwnerType::Vendor => store
            .commission_rate(&order.category)
            .unwrap_or(settings.default_commission_percent),
    }
}

/// `total * rate / 100`, rounded to 4 decimal places (banker's rounding).
pub fn commission_fee(total: Decimal, rate: Decimal) -> Decimal {
    (total * rate / Decimal::from(100u32)).round_dp(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::testing::product_order;

    #[test]
    fn reseller_rate_wins_over_category() {
        let mut store = InMemoryStore::new(5);
        store.set_commission_rule("electronics", Decimal::from(8u32));
        let settings = PlatformSettings::default();
        let order = product_order(1, 100, "electronics");

        let rate = resolve_rate(&order, OwnerType::Reseller, &store, &settings);
        assert_eq!(rate, Decimal::from(7u32));
    }

    #[test]
    fn category_rule_applies_to_vendors() {
        let mut store = InMemoryStore::new(5);
        store.set_commission_rule("electronics", Decimal::from(8u32));
        let settings = PlatformSettings::default();
        let order = product_order(1, 100, "electronics");

        let rate = resolve_rate(&order, OwnerType::Vendor, &store, &settings);
        assert_eq!(rate, Decimal::from(8u32));
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        let store = InMemoryStore::new(5);
        let settings = PlatformSettings::default();
        let order = product_order(1, 100, "no-such-category");

        let rate = resolve_rate(&order, OwnerType::Vendor, &store, &settings);
        assert_eq!(rate, Decimal::from(10u32));
    }

    #[test]
    fn fee_rounds_to_four_places() {
        // 33.3333... percent of 100 -> 33.3333
        let fee = commission_fee(Decimal::from(100u32), Decimal::new(333333, 4));
        assert_eq!(fee, Decimal::new(333333, 4));
    }

    #[test]
    fn ten_percent_of_thousand_is_one_hundred() {
        let fee = commission_fee(Decimal::from(1000u32), Decimal::from(10u32));
        assert_eq!(fee, Decimal::from(100u32));
    }
}
