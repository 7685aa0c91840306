use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{
    Account, EntryStatus, LedgerBatch, LedgerEntry, LedgerStore, Order, PlatformShard,
};

/// Seed data loaded before processing: the accounts the engine will pay
/// into and the per-category commission rules.
#[derive(Debug, Deserialize)]
pub struct SeedFixture {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub commission_rules: HashMap<String, Decimal>,
}

/// Reference [`LedgerStore`] backed by in-process maps.
///
/// Commit applies a planned batch as a whole: callers validate during
/// planning (shared borrow), then hand over the write set. The ledger map
/// is ordered so reports and settlement scans are deterministic.
#[derive(Debug)]
pub struct InMemoryStore {
    accounts: HashMap<u64, Account>,
    orders: HashMap<u64, Order>,
    ledger: BTreeMap<u64, LedgerEntry>,
    shards: Vec<PlatformShard>,
    commission_rules: HashMap<String, Decimal>,
    next_entry_id: u64,
}

impl InMemoryStore {
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(PlatformShard::new).collect();
        Self {
            accounts: HashMap::new(),
            orders: HashMap::new(),
            ledger: BTreeMap::new(),
            shards,
            commission_rules: HashMap::new(),
            next_entry_id: 1,
        }
    }

    pub fn load_fixture(&mut self, fixture: SeedFixture) {
        for account in fixture.accounts {
            self.accounts.insert(account.id, account);
        }
        for (category, rate) in fixture.commission_rules {
            self.commission_rules.insert(category, rate);
        }
    }

    fn get_or_create_account(&mut self, account_id: u64) -> &mut Account {
        self.accounts
            .entry(account_id)
            .or_insert_with(|| Account::new(account_id))
    }
}

impl LedgerStore for InMemoryStore {
    fn upsert_account(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    fn account(&self, id: u64) -> Option<&Account> {
        self.accounts.get(&id)
    }

    fn find_referrer(&self, code: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.referral_code.as_deref() == Some(code))
    }

    fn apply_order_snapshot(&mut self, incoming: &Order) -> Order {
        let mut merged = incoming.clone();
        if let Some(existing) = self.orders.get(&incoming.id) {
            // Idempotency flags are set exactly once; a stale snapshot
            // cannot unset them.
            merged.is_processed |= existing.is_processed;
            merged.is_refunded |= existing.is_refunded;
        }
        self.orders.insert(merged.id, merged.clone());
        merged
    }

    fn order(&self, id: u64) -> Option<&Order> {
        self.orders.get(&id)
    }

    fn entry(&self, id: u64) -> Option<&LedgerEntry> {
        self.ledger.get(&id)
    }

    fn entries_for_order(&self, order_id: u64) -> Vec<&LedgerEntry> {
        self.ledger
            .values()
            .filter(|e| e.order_id == Some(order_id))
            .collect()
    }

    fn due_entry_ids(&self, now: DateTime<Utc>) -> Vec<u64> {
        self.ledger
            .values()
            .filter(|e| e.is_due(now))
            .map(|e| e.id)
            .collect()
    }

    fn set_commission_rule(&mut self, category: &str, rate: Decimal) {
        self.commission_rules.insert(category.to_owned(), rate);
    }

    fn commission_rate(&self, category: &str) -> Option<Decimal> {
        self.commission_rules.get(category).copied()
    }

    fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_balance(&self, shard_id: usize) -> Decimal {
        self.shards
            .get(shard_id)
            .map(|s| s.wallet_balance)
            .unwrap_or(Decimal::ZERO)
    }

    fn platform_balance(&self) -> Decimal {
        self.shards.iter().map(|s| s.wallet_balance).sum()
    }

    fn commit(&mut self, batch: LedgerBatch, at: DateTime<Utc>) -> Vec<u64> {
        for update in &batch.entry_updates {
            match self.ledger.get_mut(&update.entry_id) {
                Some(entry) => {
                    entry.status = update.new_status;
                    match update.new_status {
                        EntryStatus::Completed => entry.settled_at = Some(at),
                        EntryStatus::Cancelled => entry.cancelled_at = Some(at),
                        _ => {}
                    }
                    if let Some(note) = &update.note {
                        if !entry.description.is_empty() {
                            entry.description.push_str("; ");
                        }
                        entry.description.push_str(note);
                    }
                }
                None => {
                    // Planner looked the entry up moments ago under the
                    // same exclusive access; reaching this means a bug.
                    tracing::error!(entry_id = update.entry_id, "commit: unknown ledger entry");
                }
            }
        }

        let mut created = Vec::with_capacity(batch.new_entries.len());
        for new in batch.new_entries {
            let id = self.next_entry_id;
            self.next_entry_id += 1;
            self.ledger.insert(
                id,
                LedgerEntry {
                    id,
                    owner_account_id: new.owner_account_id,
                    kind: new.kind,
                    amount: new.amount,
                    created_at: at,
                    settle_at: new.settle_at,
                    settled_at: None,
                    cancelled_at: None,
                    status: new.status,
                    order_id: new.order_id,
                    description: new.description,
                },
            );
            created.push(id);
        }

        for (account_id, amount) in batch.wallet_credits {
            self.get_or_create_account(account_id).credit(amount, at);
        }

        for (shard_id, amount) in batch.shard_credits {
            match self.shards.get_mut(shard_id) {
                Some(shard) => {
                    shard.wallet_balance += amount;
                    shard.last_updated = Some(at);
                }
                None => {
                    tracing::error!(shard_id, "commit: shard id out of range");
                }
            }
        }

        if let Some(order_id) = batch.mark_processed {
            if let Some(order) = self.orders.get_mut(&order_id) {
                order.is_processed = true;
            }
        }
        if let Some(order_id) = batch.mark_refunded {
            if let Some(order) = self.orders.get_mut(&order_id) {
                order.is_refunded = true;
            }
        }

        created
    }

    fn flush(&mut self) {
        println!("account,wallet_balance,payout_requested");
        let mut ids: Vec<u64> = self.accounts.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(account) = self.accounts.get(&id) {
                println!(
                    "{},{},{}",
                    id,
                    account.wallet_balance.round_dp(4),
                    account.payout_requested
                );
            }
        }
        println!("shard,balance");
        for shard in &self.shards {
            println!("{},{}", shard.shard_id, shard.wallet_balance.round_dp(4));
        }
        println!("platform_total,{}", self.platform_balance().round_dp(4));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryKind, EntryUpdate, NewEntry};
    use crate::shards::ShardSelector;
    use crate::testing::product_order;

    fn new_entry(owner: u64, amount: i64, status: EntryStatus) -> NewEntry {
        NewEntry {
            owner_account_id: owner,
            kind: EntryKind::SaleRevenue,
            amount: Decimal::from(amount),
            settle_at: None,
            status,
            order_id: None,
            description: String::new(),
        }
    }

    #[test]
    fn commit_assigns_monotonic_entry_ids() {
        let mut store = InMemoryStore::new(5);
        let batch = LedgerBatch {
            new_entries: vec![
                new_entry(1, 100, EntryStatus::Pending),
                new_entry(1, -10, EntryStatus::Pending),
            ],
            ..Default::default()
        };
        let ids = store.commit(batch, Utc::now());
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.entry(2).unwrap().amount, Decimal::from(-10i64));
    }

    #[test]
    fn wallet_credit_creates_missing_account() {
        let mut store = InMemoryStore::new(5);
        let batch = LedgerBatch {
            wallet_credits: vec![(42, Decimal::from(250u32))],
            ..Default::default()
        };
        store.commit(batch, Utc::now());
        let account = store.account(42).unwrap();
        assert_eq!(account.wallet_balance, Decimal::from(250u32));
        assert!(account.last_transaction_date.is_some());
    }

    #[test]
    fn idempotency_flags_are_sticky_across_snapshots() {
        let mut store = InMemoryStore::new(5);
        let order = product_order(7, 100, "food");
        store.apply_order_snapshot(&order);
        store.commit(
            LedgerBatch {
                mark_processed: Some(7),
                ..Default::default()
            },
            Utc::now(),
        );

        // A later snapshot still claiming unprocessed must not reset the flag.
        let effective = store.apply_order_snapshot(&order);
        assert!(effective.is_processed);
        assert!(store.order(7).unwrap().is_processed);
    }

    #[test]
    fn shard_sum_matches_applied_credits() {
        let mut store = InMemoryStore::new(5);
        let mut selector = ShardSelector::with_seed(3);
        let mut expected = Decimal::ZERO;
        for i in 0..100i64 {
            let amount = Decimal::from(i - 50);
            expected += amount;
            let shard = selector.pick(store.shard_count());
            store.commit(
                LedgerBatch {
                    shard_credits: vec![(shard, amount)],
                    ..Default::default()
                },
                Utc::now(),
            );
        }
        assert_eq!(store.platform_balance(), expected);
    }

    #[test]
    fn entry_update_stamps_transition_and_note() {
        let mut store = InMemoryStore::new(5);
        let ids = store.commit(
            LedgerBatch {
                new_entries: vec![new_entry(1, 100, EntryStatus::Pending)],
                ..Default::default()
            },
            Utc::now(),
        );
        store.commit(
            LedgerBatch {
                entry_updates: vec![EntryUpdate {
                    entry_id: ids[0],
                    new_status: EntryStatus::Cancelled,
                    note: Some("reversed by refund of order 9".into()),
                }],
                ..Default::default()
            },
            Utc::now(),
        );
        let entry = store.entry(ids[0]).unwrap();
        assert_eq!(entry.status, EntryStatus::Cancelled);
        assert!(entry.cancelled_at.is_some());
        assert!(entry.description.contains("reversed by refund"));
        // Amount untouched.
        assert_eq!(entry.amount, Decimal::from(100u32));
    }
}
