use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of N independent counters whose sum approximates the platform's
/// aggregate revenue. Every write lands on exactly one shard; reads that
/// need the true total sum all of them.
///
/// An individual shard may go negative; only the aggregate is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformShard {
    pub shard_id: usize,
    pub wallet_balance: Decimal,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PlatformShard {
    pub fn new(shard_id: usize) -> Self {
        Self {
            shard_id,
            wallet_balance: Decimal::ZERO,
            last_updated: None,
        }
    }
}
