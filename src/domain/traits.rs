use chrono::{DateTime, Utc};
use futures::Stream;
use rust_decimal::Decimal;

use crate::audit::AuditEvent;
use crate::domain::{Account, Error, LedgerBatch, LedgerEntry, Order, OrderEvent};
use crate::notify::Notification;

/// Source of order state-change events.
pub trait EventStream {
    type EvStream: Stream<Item = Result<OrderEvent, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::EvStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// The persistence seam. One implementation backs the engine at a time;
/// every multi-record mutation goes through [`commit`](Self::commit),
/// which applies a planned [`LedgerBatch`] as a whole.
pub trait LedgerStore {
    fn upsert_account(&mut self, account: Account);
    fn account(&self, id: u64) -> Option<&Account>;
    /// Account whose referral code matches, if any.
    fn find_referrer(&self, code: &str) -> Option<&Account>;

    /// Merge an inbound order snapshot into the store and return the
    /// effective order. The idempotency flags are sticky: once set in the
    /// store they stay set, whatever the snapshot claims.
    fn apply_order_snapshot(&mut self, incoming: &Order) -> Order;
    fn order(&self, id: u64) -> Option<&Order>;

    fn entry(&self, id: u64) -> Option<&LedgerEntry>;
    fn entries_for_order(&self, order_id: u64) -> Vec<&LedgerEntry>;
    /// Ids of every Pending entry whose hold period has elapsed at `now`,
    /// excluding admin withdrawals.
    fn due_entry_ids(&self, now: DateTime<Utc>) -> Vec<u64>;

    fn set_commission_rule(&mut self, category: &str, rate: Decimal);
    fn commission_rate(&self, category: &str) -> Option<Decimal>;

    fn shard_count(&self) -> usize;
    fn shard_balance(&self, shard_id: usize) -> Decimal;
    /// Sum over all shards. Reporting and payout preflight only — never
    /// part of the hot write path.
    fn platform_balance(&self) -> Decimal;

    /// Apply every write in the batch, all together, stamping `at`.
    /// Returns the ids assigned to the batch's new entries, in order.
    fn commit(&mut self, batch: LedgerBatch, at: DateTime<Utc>) -> Vec<u64>;

    /// Write the balance report.
    fn flush(&mut self);
}

/// Fire-and-forget audit trail. Implementations swallow and log their own
/// failures; recording must never fail the financial operation.
pub trait AuditSink {
    fn record(&self, event: AuditEvent);
}

/// Fire-and-forget user notifications, same failure contract as
/// [`AuditSink`].
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}
