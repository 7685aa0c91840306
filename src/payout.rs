//! Admin-gated withdrawal from the platform's aggregate balance.
//!
//! The only path that reads the true platform total (sum of shards), and
//! the only entries the settlement pass deliberately never touches.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PlatformSettings;
use crate::domain::{EntryKind, EntryStatus, Error, LedgerBatch, LedgerStore, NewEntry};
use crate::shards::ShardSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    User,
}

#[derive(Debug, Clone)]
pub struct PayoutRequest {
    pub amount: Decimal,
    pub destination: String,
    pub method: String,
    pub actor_id: u64,
    pub actor_role: ActorRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutReceipt {
    pub transaction_id: u64,
    pub needs_approval: bool,
}

/// Initiate a platform payout. Above the approval threshold the entry is
/// parked as PendingApproval and no shard is touched; otherwise one shard
/// is debited immediately (a single shard may go negative — only the
/// aggregate total is constrained).
pub fn initiate_payout<S: LedgerStore>(
    store: &mut S,
    settings: &PlatformSettings,
    selector: &mut ShardSelector,
    request: &PayoutRequest,
    now: DateTime<Utc>,
) -> Result<PayoutReceipt, Error> {
    if request.actor_role != ActorRole::Admin {
        return Err(Error::PermissionDenied(format!(
            "account {} is not an admin",
            request.actor_id
        )));
    }

    let available = store.platform_balance();
    if request.amount > available {
        return Err(Error::InsufficientBalance {
            requested: request.amount,
            available,
        });
    }

    let needs_approval = request.amount > settings.payout_approval_threshold;
    let mut batch = LedgerBatch {
        new_entries: vec![NewEntry {
            owner_account_id: request.actor_id,
            kind: EntryKind::AdminWithdrawal,
            amount: -request.amount,
            settle_at: None,
            status: if needs_approval {
                EntryStatus::PendingApproval
            } else {
                EntryStatus::Completed
            },
            order_id: None,
            description: format!(
                "Admin withdrawal to {} via {}",
                request.destination, request.method
            ),
        }],
        ..Default::default()
    };
    if !needs_approval {
        batch
            .shard_credits
            .push((selector.pick(store.shard_count()), -request.amount));
    }

    let created = store.commit(batch, now);
    tracing::info!(
        actor = request.actor_id,
        amount = %request.amount,
        needs_approval,
        "payout initiated"
    );

    Ok(PayoutReceipt {
        transaction_id: created[0],
        needs_approval,
    })
}
