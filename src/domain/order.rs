use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Lifecycle states an order moves through. Product orders follow the
/// `Pending -> ... -> Delivered -> Completed` line; service (ride) orders
/// follow `RideRequested -> RideAccepted -> RideCompleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Completed,
    RideRequested,
    RideAccepted,
    RideCompleted,
    Cancelled,
    RefundRequested,
    RefundApproved,
    RefundRejected,
}

impl OrderStatus {
    /// Parse the human-readable status strings carried by inbound events
    /// ("Out for Delivery", "ride_completed", ...). Case-insensitive;
    /// spaces and underscores are interchangeable.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "_").replace('-', "_");
        let status = match normalized.as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "preparing" => Self::Preparing,
            "out_for_delivery" => Self::OutForDelivery,
            "delivered" => Self::Delivered,
            "completed" => Self::Completed,
            "ride_requested" => Self::RideRequested,
            "ride_accepted" => Self::RideAccepted,
            "ride_completed" => Self::RideCompleted,
            "cancelled" | "canceled" => Self::Cancelled,
            "refund_requested" => Self::RefundRequested,
            "refund_approved" => Self::RefundApproved,
            "refund_rejected" => Self::RefundRejected,
            other => {
                return Err(Error::Ingestion(format!("Invalid order status: {}", other)));
            }
        };
        Ok(status)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::RideRequested => "ride_requested",
            Self::RideAccepted => "ride_accepted",
            Self::RideCompleted => "ride_completed",
            Self::Cancelled => "cancelled",
            Self::RefundRequested => "refund_requested",
            Self::RefundApproved => "refund_approved",
            Self::RefundRejected => "refund_rejected",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Wallet,
    Other(String),
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "wallet" {
            Self::Wallet
        } else {
            Self::Other(normalized)
        }
    }

    pub fn is_wallet(&self) -> bool {
        matches!(self, Self::Wallet)
    }
}

/// The commercial event every ledger movement traces back to.
///
/// `is_processed` and `is_refunded` are idempotency guards: each is set
/// exactly once, inside the same committed batch as the financial writes
/// it protects, and is never unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub vendor_id: u64,
    pub customer_id: u64,
    pub total: Decimal,
    pub category: String,
    pub delivery_fee: Decimal,
    pub assigned_delivery_man_id: Option<u64>,
    pub referral_code: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub is_processed: bool,
    pub is_refunded: bool,
}

/// An order state-change notification as delivered by the commerce flow:
/// a `(before, after)` status pair plus the order snapshot.
#[derive(Debug, Clone)]
pub struct OrderEvent {
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    pub order: Order,
    pub occurred_at: DateTime<Utc>,
}

impl core::fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "order={},{}->{},total={}",
            self.order.id, self.previous_status, self.new_status, self.order.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn parses_spaced_and_underscored_forms() {
        assert_eq!(
            OrderStatus::parse("Out for Delivery").unwrap(),
            OrderStatus::OutForDelivery
        );
        assert_eq!(
            OrderStatus::parse("ride_completed").unwrap(),
            OrderStatus::RideCompleted
        );
        assert_eq!(
            OrderStatus::parse(" Refund Approved ").unwrap(),
            OrderStatus::RefundApproved
        );
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(OrderStatus::parse("shipped sideways").is_err());
    }
}
