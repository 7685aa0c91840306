use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Any entity that can hold a balance: vendor, reseller, customer,
/// delivery partner, referrer. One unified collection, keyed by id.
///
/// `wallet_balance` is only ever mutated through a committed
/// [`LedgerBatch`](crate::domain::LedgerBatch), never written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(default)]
    pub is_vendor: bool,
    #[serde(default)]
    pub is_reseller: bool,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub wallet_balance: Decimal,
    #[serde(default)]
    pub payout_requested: bool,
    #[serde(default)]
    pub last_transaction_date: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            is_vendor: false,
            is_reseller: false,
            referral_code: None,
            wallet_balance: Decimal::ZERO,
            payout_requested: false,
            last_transaction_date: None,
        }
    }

    /// Signed credit; stamps the last transaction date.
    pub fn credit(&mut self, amount: Decimal, at: DateTime<Utc>) {
        self.wallet_balance += amount;
        self.last_transaction_date = Some(at);
    }
}

/// Which kind of account owns an order's net revenue share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerType {
    Vendor,
    Reseller,
}
