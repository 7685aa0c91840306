//! Settlement of matured ledger entries.
//!
//! A pass selects every Pending entry whose hold has elapsed and applies
//! its amount to the owning account's spendable balance; commission and
//! referral entries also realize their platform-side impact on a random
//! shard. Each entry settles in its own committed batch: one bad entry is
//! logged and skipped, the rest of the pass proceeds. Entries flip to
//! Completed on success and are never reselected, so a pass interrupted
//! mid-batch simply resumes on the next run.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::audit::{AuditAction, AuditEvent};
use crate::domain::{
    AuditSink, EntryKind, EntryStatus, EntryUpdate, Error, LedgerBatch, LedgerStore,
};
use crate::shards::ShardSelector;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SettlementReport {
    pub settled: usize,
    pub failed: usize,
}

/// Run one settlement pass at `now`.
pub fn settle_due<S: LedgerStore, A: AuditSink>(
    store: &mut S,
    selector: &mut ShardSelector,
    audit: &A,
    now: DateTime<Utc>,
) -> SettlementReport {
    let due = store.due_entry_ids(now);
    let mut report = SettlementReport::default();

    for entry_id in due {
        match plan_entry(store, selector, entry_id) {
            Ok((batch, meta)) => {
                store.commit(batch, now);
                report.settled += 1;
                audit.record(AuditEvent {
                    actor: None,
                    action: AuditAction::EntrySettled,
                    target_type: "ledger_entry".into(),
                    target_id: entry_id,
                    metadata: meta,
                    at: now,
                });
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(entry_id, error = %e, "entry settlement failed, continuing");
            }
        }
    }

    if report.settled > 0 || report.failed > 0 {
        tracing::info!(
            settled = report.settled,
            failed = report.failed,
            "settlement pass finished"
        );
    }
    report
}

fn plan_entry<S: LedgerStore>(
    store: &S,
    selector: &mut ShardSelector,
    entry_id: u64,
) -> Result<(LedgerBatch, serde_json::Value), Error> {
    let entry = store
        .entry(entry_id)
        .ok_or_else(|| Error::Ledger(format!("Entry {} vanished mid-pass", entry_id)))?;
    if entry.status != EntryStatus::Pending {
        return Err(Error::Ledger(format!(
            "Entry {} is no longer pending",
            entry_id
        )));
    }

    let mut batch = LedgerBatch {
        wallet_credits: vec![(entry.owner_account_id, entry.amount)],
        entry_updates: vec![EntryUpdate {
            entry_id,
            new_status: EntryStatus::Completed,
            note: None,
        }],
        ..Default::default()
    };

    // Platform impact is realized at maturation: a matured commission
    // deduction credits a shard with the fee, a matured referral
    // commission debits a shard (referral is a platform cost).
    match entry.kind {
        EntryKind::CommissionDeduction => {
            batch
                .shard_credits
                .push((selector.pick(store.shard_count()), entry.amount.abs()));
        }
        EntryKind::ReferralCommission => {
            batch
                .shard_credits
                .push((selector.pick(store.shard_count()), -entry.amount));
        }
        _ => {}
    }

    let meta = json!({
        "kind": entry.kind.to_string(),
        "amount": entry.amount,
        "owner": entry.owner_account_id,
        "order_id": entry.order_id,
    });
    Ok((batch, meta))
}

/// Periodic wrapper around [`settle_due`]. The first tick fires
/// immediately, which doubles as the startup catch-up pass.
#[derive(Debug)]
pub struct SettlementScheduler {
    period: std::time::Duration,
}

impl SettlementScheduler {
    pub fn new(period: std::time::Duration) -> Self {
        Self { period }
    }

    pub fn from_settings(settings: &crate::config::PlatformSettings) -> Self {
        Self::new(std::time::Duration::from_secs(settings.settlement_interval_secs))
    }

    pub async fn run<S: LedgerStore, A: AuditSink>(
        &self,
        store: &mut S,
        selector: &mut ShardSelector,
        audit: &A,
    ) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(period_secs = self.period.as_secs(), "settlement scheduler started");
        loop {
            interval.tick().await;
            settle_due(store, selector, audit, Utc::now());
        }
    }
}
