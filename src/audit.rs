//! Audit trail for financial operations.
//!
//! Every distribution, reversal, settlement and payout produces an
//! [`AuditEvent`]. Recording is best-effort: a sink that cannot persist an
//! event logs the failure and moves on — the financial operation that
//! produced it has already committed and must not be failed retroactively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AuditSink;

/// Closed set of auditable actions, not free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    RevenueDistributed,
    RefundReversed,
    EntrySettled,
    PayoutInitiated,
    PayoutParked,
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::RevenueDistributed => "revenue_distributed",
            Self::RefundReversed => "refund_reversed",
            Self::EntrySettled => "entry_settled",
            Self::PayoutInitiated => "payout_initiated",
            Self::PayoutParked => "payout_parked",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Account id of the acting party; `None` for system-triggered work
    /// (settlement passes).
    pub actor: Option<u64>,
    pub action: AuditAction,
    pub target_type: String,
    pub target_id: u64,
    pub metadata: serde_json::Value,
    pub at: DateTime<Utc>,
}

/// Sink that emits audit events into the tracing pipeline.
#[derive(Default, Debug)]
pub struct LogAudit {}

impl AuditSink for LogAudit {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            action = %event.action,
            target_type = %event.target_type,
            target_id = event.target_id,
            actor = ?event.actor,
            metadata = %event.metadata,
            "audit"
        );
    }
}

/// Test double capturing events for inspection.
#[cfg(test)]
#[derive(Default, Debug)]
pub struct RecordingAudit {
    pub events: std::cell::RefCell<Vec<AuditEvent>>,
}

#[cfg(test)]
impl AuditSink for RecordingAudit {
    fn record(&self, event: AuditEvent) {
        self.events.borrow_mut().push(event);
    }
}
