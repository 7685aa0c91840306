use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    /// Neither a vendor nor a reseller account matched the order's target.
    /// The order is left unprocessed for manual inspection.
    #[error("No vendor or reseller account {account_id} for order {order_id}")]
    OwnerNotFound { order_id: u64, account_id: u64 },

    #[error("Payout of {requested} exceeds platform balance {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Ledger failed with: {0}")]
    Ledger(String),
}
