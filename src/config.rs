use rust_decimal::Decimal;

/// Platform settings — reference data for commission resolution, holds,
/// sharding and payout approval.
///
/// Every knob can be overridden through an environment variable:
///
/// | Environment variable | Default | Meaning |
/// |----------------------|---------|---------|
/// | DEFAULT_COMMISSION_PERCENT | 10 | fallback category commission |
/// | RESELLER_COMMISSION_PERCENT | 7 | flat reseller commission |
/// | REFERRAL_COMMISSION_PERCENT | 5 | referral commission on order total |
/// | DELIVERY_COMMISSION_PERCENT | 10 | platform cut of the delivery fee |
/// | HOLD_PERIOD_DAYS | 3 | product-order maturation hold |
/// | SHARD_COUNT | 5 | platform balance shards |
/// | PAYOUT_APPROVAL_THRESHOLD | 10000 | payouts above this park for approval |
/// | SETTLEMENT_INTERVAL_SECS | 86400 | periodic settlement pass interval |
#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub default_commission_percent: Decimal,
    pub reseller_commission_percent: Decimal,
    pub referral_commission_percent: Decimal,
    pub delivery_commission_percent: Decimal,
    pub hold_period_days: i64,
    pub shard_count: usize,
    pub payout_approval_threshold: Decimal,
    pub settlement_interval_secs: u64,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            default_commission_percent: Decimal::from(10u32),
            reseller_commission_percent: Decimal::from(7u32),
            referral_commission_percent: Decimal::from(5u32),
            delivery_commission_percent: Decimal::from(10u32),
            hold_period_days: 3,
            shard_count: 5,
            payout_approval_threshold: Decimal::from(10_000u32),
            settlement_interval_secs: 86_400,
        }
    }
}

impl PlatformSettings {
    /// Load settings from the environment, falling back to the defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            default_commission_percent: env_or("DEFAULT_COMMISSION_PERCENT", base.default_commission_percent),
            reseller_commission_percent: env_or("RESELLER_COMMISSION_PERCENT", base.reseller_commission_percent),
            referral_commission_percent: env_or("REFERRAL_COMMISSION_PERCENT", base.referral_commission_percent),
            delivery_commission_percent: env_or("DELIVERY_COMMISSION_PERCENT", base.delivery_commission_percent),
            hold_period_days: env_or("HOLD_PERIOD_DAYS", base.hold_period_days),
            shard_count: env_or("SHARD_COUNT", base.shard_count),
            payout_approval_threshold: env_or("PAYOUT_APPROVAL_THRESHOLD", base.payout_approval_threshold),
            settlement_interval_secs: env_or("SETTLEMENT_INTERVAL_SECS", base.settlement_interval_secs),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
