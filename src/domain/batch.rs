use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::entry::{EntryKind, EntryStatus};

/// A ledger entry about to be created; the store assigns the id at commit.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub owner_account_id: u64,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub settle_at: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    pub order_id: Option<u64>,
    pub description: String,
}

/// A status transition for an existing entry. Amounts are immutable, so
/// this is the only mutation a committed batch can apply to an entry.
#[derive(Debug, Clone)]
pub struct EntryUpdate {
    pub entry_id: u64,
    pub new_status: EntryStatus,
    /// Appended to the entry description (reversal notes).
    pub note: Option<String>,
}

/// The explicit write set of one financial operation.
///
/// Handlers *plan* a batch (fallible, read-only) and the store *commits*
/// it (infallible, all writes applied together). Nothing is written until
/// commit, so a planning failure leaves the store untouched and the
/// operation retryable.
#[derive(Debug, Clone, Default)]
pub struct LedgerBatch {
    pub new_entries: Vec<NewEntry>,
    pub entry_updates: Vec<EntryUpdate>,
    /// Signed wallet deltas, keyed by account id.
    pub wallet_credits: Vec<(u64, Decimal)>,
    /// Signed shard deltas; the shard was already chosen at planning time.
    pub shard_credits: Vec<(usize, Decimal)>,
    /// Idempotency flags set as part of the same commit.
    pub mark_processed: Option<u64>,
    pub mark_refunded: Option<u64>,
}

impl LedgerBatch {
    pub fn is_empty(&self) -> bool {
        self.new_entries.is_empty()
            && self.entry_updates.is_empty()
            && self.wallet_credits.is_empty()
            && self.shard_credits.is_empty()
            && self.mark_processed.is_none()
            && self.mark_refunded.is_none()
    }
}
