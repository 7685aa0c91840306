use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    SaleRevenue,
    CommissionDeduction,
    ReferralCommission,
    Refund,
    AdminWithdrawal,
}

impl core::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::SaleRevenue => "sale_revenue",
            Self::CommissionDeduction => "commission_deduction",
            Self::ReferralCommission => "referral_commission",
            Self::Refund => "refund",
            Self::AdminWithdrawal => "admin_withdrawal",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Completed,
    Cancelled,
    PendingApproval,
}

/// An immutable record of a single monetary movement.
///
/// The amount never changes after creation; only `status` transitions,
/// together with the timestamp recording that transition (`settled_at`
/// or `cancelled_at`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub owner_account_id: u64,
    pub kind: EntryKind,
    /// Signed: deductions are negative.
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    /// `None` means not subject to holding — the movement was final at
    /// creation time.
    pub settle_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    pub order_id: Option<u64>,
    pub description: String,
}

impl LedgerEntry {
    /// Whether a settlement pass at `now` should mature this entry.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == EntryStatus::Pending
            && self.kind != EntryKind::AdminWithdrawal
            && self.settle_at.is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn entry(status: EntryStatus, kind: EntryKind, settle_at: Option<DateTime<Utc>>) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            owner_account_id: 10,
            kind,
            amount: Decimal::from(100u32),
            created_at: Utc::now(),
            settle_at,
            settled_at: None,
            cancelled_at: None,
            status,
            order_id: Some(7),
            description: String::new(),
        }
    }

    #[test]
    fn due_only_when_pending_and_elapsed() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        let future = Some(now + Duration::hours(1));

        assert!(entry(EntryStatus::Pending, EntryKind::SaleRevenue, past).is_due(now));
        assert!(!entry(EntryStatus::Pending, EntryKind::SaleRevenue, future).is_due(now));
        assert!(!entry(EntryStatus::Completed, EntryKind::SaleRevenue, past).is_due(now));
        assert!(!entry(EntryStatus::Pending, EntryKind::SaleRevenue, None).is_due(now));
    }

    #[test]
    fn admin_withdrawals_are_never_due() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        assert!(!entry(EntryStatus::Pending, EntryKind::AdminWithdrawal, past).is_due(now));
    }
}
