//! Ledger & settlement engine for a multi-vendor marketplace.
//!
//! On every qualifying order-status transition the engine computes
//! commission, distributes revenue among vendor / platform / delivery
//! partner / referrer as immutable ledger entries, holds product-order
//! funds for a maturation period, settles them into spendable balances on
//! a periodic pass, and reverses still-pending entries on refund. The
//! platform's aggregate balance is kept as independent shard counters to
//! spread write contention.

pub mod audit;
pub mod commission;
pub mod config;
pub mod distribution;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod ingestion;
pub mod notify;
pub mod payout;
pub mod refund;
pub mod settlement;
pub mod shards;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PlatformSettings;
pub use engine::Engine;
pub use payout::{ActorRole, PayoutReceipt, PayoutRequest};
pub use settlement::{SettlementReport, SettlementScheduler};
pub use shards::ShardSelector;
pub use store::{InMemoryStore, SeedFixture};
