//! Refund / cancellation reversal.
//!
//! Credits the customer back in full and cancels every still-pending
//! ledger entry of the order so the settlement pass can never mature money
//! that has already been returned. Entries that completed before the
//! refund are left alone — funds already paid out are not clawed back.

use chrono::{DateTime, Utc};

use crate::domain::{
    EntryKind, EntryStatus, EntryUpdate, Error, LedgerBatch, LedgerStore, NewEntry, Order,
};

#[derive(Debug)]
pub struct RefundOutcome {
    pub order_id: u64,
    pub customer_id: u64,
    pub refund_entry_id: u64,
    pub cancelled_entry_ids: Vec<u64>,
}

/// Reverse an order's ledger effects. Returns `Ok(None)` when the order is
/// already refunded (idempotent) or was not paid from a wallet (the
/// gateway owns that refund).
pub fn reverse<S: LedgerStore>(
    store: &mut S,
    order: &Order,
    now: DateTime<Utc>,
) -> Result<Option<RefundOutcome>, Error> {
    if order.is_refunded {
        tracing::debug!(order_id = order.id, "order already refunded, skipping");
        return Ok(None);
    }
    if !order.payment_method.is_wallet() {
        tracing::debug!(order_id = order.id, "non-wallet payment, no wallet reversal");
        return Ok(None);
    }

    let cancelled: Vec<EntryUpdate> = store
        .entries_for_order(order.id)
        .into_iter()
        .filter(|e| e.status == EntryStatus::Pending)
        .map(|e| EntryUpdate {
            entry_id: e.id,
            new_status: EntryStatus::Cancelled,
            note: Some(format!("reversed by refund of order {}", order.id)),
        })
        .collect();
    let cancelled_entry_ids: Vec<u64> = cancelled.iter().map(|u| u.entry_id).collect();

    let batch = LedgerBatch {
        new_entries: vec![NewEntry {
            owner_account_id: order.customer_id,
            kind: EntryKind::Refund,
            amount: order.total,
            settle_at: None,
            status: EntryStatus::Completed,
            order_id: Some(order.id),
            description: format!("Refund for order {}", order.id),
        }],
        entry_updates: cancelled,
        wallet_credits: vec![(order.customer_id, order.total)],
        mark_refunded: Some(order.id),
        ..Default::default()
    };

    let created = store.commit(batch, now);
    tracing::info!(
        order_id = order.id,
        customer = order.customer_id,
        cancelled = cancelled_entry_ids.len(),
        "refund reversed"
    );

    Ok(Some(RefundOutcome {
        order_id: order.id,
        customer_id: order.customer_id,
        refund_entry_id: created[0],
        cancelled_entry_ids,
    }))
}
