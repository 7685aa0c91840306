//! Revenue distribution on qualifying order-status transitions.
//!
//! Fires once per order: `Delivered` parks the vendor's funds behind the
//! hold period, `RideCompleted` releases them immediately. The whole write
//! set — ledger entries, wallet credits, shard credits, the idempotency
//! flag — is planned first and committed as one batch, so a failure during
//! planning leaves nothing applied and the trigger safely retryable.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::commission::{commission_fee, resolve_rate};
use crate::config::PlatformSettings;
use crate::domain::{
    EntryKind, EntryStatus, Error, LedgerBatch, LedgerStore, NewEntry, Order, OrderStatus,
    OwnerType,
};
use crate::shards::ShardSelector;

/// What a completed distribution did, for audit and notification.
#[derive(Debug)]
pub struct DistributionOutcome {
    pub order_id: u64,
    pub owner_account_id: u64,
    pub owner_type: OwnerType,
    pub fee: Decimal,
    pub immediate: bool,
    pub entry_ids: Vec<u64>,
}

/// Distribute an order's revenue. Returns `Ok(None)` when the order was
/// already processed — the retried trigger is a no-op by design.
pub fn distribute<S: LedgerStore>(
    store: &mut S,
    settings: &PlatformSettings,
    selector: &mut ShardSelector,
    order: &Order,
    trigger: OrderStatus,
    now: DateTime<Utc>,
) -> Result<Option<DistributionOutcome>, Error> {
    if order.is_processed {
        tracing::debug!(order_id = order.id, "order already processed, skipping");
        return Ok(None);
    }

    let (owner_id, owner_type) = resolve_owner(store, order)?;
    let rate = resolve_rate(order, owner_type, store, settings);
    let fee = commission_fee(order.total, rate);

    let immediate = trigger == OrderStatus::RideCompleted;
    let settle_at = if immediate {
        None
    } else {
        Some(now + Duration::days(settings.hold_period_days))
    };
    let status = if immediate {
        EntryStatus::Completed
    } else {
        EntryStatus::Pending
    };

    let mut batch = LedgerBatch {
        mark_processed: Some(order.id),
        ..Default::default()
    };

    batch.new_entries.push(NewEntry {
        owner_account_id: owner_id,
        kind: EntryKind::SaleRevenue,
        amount: order.total,
        settle_at,
        status,
        order_id: Some(order.id),
        description: format!("Sale revenue for order {}", order.id),
    });
    batch.new_entries.push(NewEntry {
        owner_account_id: owner_id,
        kind: EntryKind::CommissionDeduction,
        amount: -fee,
        settle_at,
        status,
        order_id: Some(order.id),
        description: format!("Commission ({}%) for order {}", rate, order.id),
    });

    if immediate {
        batch.wallet_credits.push((owner_id, order.total - fee));
        batch
            .shard_credits
            .push((selector.pick(store.shard_count()), fee));
    }

    // Delivery is fulfilled on handover, so the partner is paid out
    // immediately even while the vendor's share is still held.
    if !immediate {
        if let Some(partner_id) = order.assigned_delivery_man_id {
            if order.delivery_fee > Decimal::ZERO {
                let cut = commission_fee(order.delivery_fee, settings.delivery_commission_percent);
                let partner_share = order.delivery_fee - cut;
                batch.new_entries.push(NewEntry {
                    owner_account_id: partner_id,
                    kind: EntryKind::SaleRevenue,
                    amount: partner_share,
                    settle_at: None,
                    status: EntryStatus::Completed,
                    order_id: Some(order.id),
                    description: format!("Delivery payout for order {}", order.id),
                });
                batch.wallet_credits.push((partner_id, partner_share));
                batch
                    .shard_credits
                    .push((selector.pick(store.shard_count()), cut));
            }
        }
    }

    if let Some(code) = order.referral_code.as_deref() {
        match store.find_referrer(code) {
            Some(referrer) => {
                let referral_amount =
                    commission_fee(order.total, settings.referral_commission_percent);
                let referrer_id = referrer.id;
                batch.new_entries.push(NewEntry {
                    owner_account_id: referrer_id,
                    kind: EntryKind::ReferralCommission,
                    amount: referral_amount,
                    settle_at,
                    status,
                    order_id: Some(order.id),
                    description: format!("Referral commission for order {}", order.id),
                });
                if immediate {
                    batch.wallet_credits.push((referrer_id, referral_amount));
                    // Referral is a platform cost, not a cut of the fee.
                    batch
                        .shard_credits
                        .push((selector.pick(store.shard_count()), -referral_amount));
                }
            }
            None => {
                tracing::debug!(order_id = order.id, code, "referral code matches no account");
            }
        }
    }

    let entry_ids = store.commit(batch, now);
    tracing::info!(
        order_id = order.id,
        owner = owner_id,
        fee = %fee,
        immediate,
        "revenue distributed"
    );

    Ok(Some(DistributionOutcome {
        order_id: order.id,
        owner_account_id: owner_id,
        owner_type,
        fee,
        immediate,
        entry_ids,
    }))
}

/// Vendor by id, else an account flagged as reseller.
fn resolve_owner<S: LedgerStore>(store: &S, order: &Order) -> Result<(u64, OwnerType), Error> {
    match store.account(order.vendor_id) {
        Some(account) if account.is_vendor => Ok((account.id, OwnerType::Vendor)),
        Some(account) if account.is_reseller => Ok((account.id, OwnerType::Reseller)),
        _ => Err(Error::OwnerNotFound {
            order_id: order.id,
            account_id: order.vendor_id,
        }),
    }
}
