use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde_json::json;

use crate::audit::{AuditAction, AuditEvent};
use crate::config::PlatformSettings;
use crate::distribution::distribute;
use crate::domain::{
    AuditSink, DeadLetterQueue, Error, EventStream, LedgerStore, NotificationSink, OrderEvent,
    OrderStatus,
};
use crate::notify::{Notification, Priority};
use crate::payout::{initiate_payout, PayoutReceipt, PayoutRequest};
use crate::refund::reverse;
use crate::settlement::{settle_due, SettlementReport, SettlementScheduler};
use crate::shards::ShardSelector;

/// The event-dispatch core: consumes order state-change events and routes
/// each to the matching financial handler based on the status delta.
/// Non-qualifying transitions pass through untouched.
#[derive(Debug)]
pub struct Engine<I, S, D, A, N>
where
    I: EventStream,
    S: LedgerStore,
    D: DeadLetterQueue,
    A: AuditSink,
    N: NotificationSink,
{
    ingestion: I,
    store: S,
    dlq: D,
    audit: A,
    notifier: N,
    settings: PlatformSettings,
    selector: ShardSelector,
}

impl<I, S, D, A, N> Engine<I, S, D, A, N>
where
    I: EventStream,
    S: LedgerStore,
    D: DeadLetterQueue,
    A: AuditSink,
    N: NotificationSink,
{
    pub fn new(
        ingestion: I,
        store: S,
        dlq: D,
        audit: A,
        notifier: N,
        settings: PlatformSettings,
    ) -> Self {
        Self {
            ingestion,
            store,
            dlq,
            audit,
            notifier,
            settings,
            selector: ShardSelector::new(),
        }
    }

    /// Drain the event stream. Failed events go to the DLQ; the stream
    /// keeps going.
    pub async fn process(&mut self) -> Result<(), Error> {
        let mut events = self.ingestion.stream();

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => match self.handle_event(event) {
                    Ok(()) => {}
                    Err(e) => self.dlq.report(&e),
                },
                Err(e) => self.dlq.report(&e),
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: OrderEvent) -> Result<(), Error> {
        let mut snapshot = event.order.clone();
        snapshot.status = event.new_status;
        let effective = self.store.apply_order_snapshot(&snapshot);

        match event.new_status {
            OrderStatus::Delivered | OrderStatus::RideCompleted => {
                let outcome = distribute(
                    &mut self.store,
                    &self.settings,
                    &mut self.selector,
                    &effective,
                    event.new_status,
                    event.occurred_at,
                )?;
                if let Some(outcome) = outcome {
                    self.audit.record(AuditEvent {
                        actor: None,
                        action: AuditAction::RevenueDistributed,
                        target_type: "order".into(),
                        target_id: outcome.order_id,
                        metadata: json!({
                            "owner": outcome.owner_account_id,
                            "fee": outcome.fee,
                            "immediate": outcome.immediate,
                            "entries": outcome.entry_ids,
                        }),
                        at: event.occurred_at,
                    });
                    self.notifier.notify(Notification::new(
                        outcome.owner_account_id,
                        format!("Revenue for order {} has been recorded", outcome.order_id),
                        Priority::Normal,
                    ));
                }
                Ok(())
            }
            OrderStatus::Cancelled | OrderStatus::RefundApproved => {
                let outcome = reverse(&mut self.store, &effective, event.occurred_at)?;
                if let Some(outcome) = outcome {
                    self.audit.record(AuditEvent {
                        actor: None,
                        action: AuditAction::RefundReversed,
                        target_type: "order".into(),
                        target_id: outcome.order_id,
                        metadata: json!({
                            "customer": outcome.customer_id,
                            "refund_entry": outcome.refund_entry_id,
                            "cancelled_entries": outcome.cancelled_entry_ids,
                        }),
                        at: event.occurred_at,
                    });
                    self.notifier.notify(Notification::new(
                        outcome.customer_id,
                        format!("Your refund for order {} has been issued", outcome.order_id),
                        Priority::High,
                    ));
                }
                Ok(())
            }
            other => {
                tracing::trace!(order_id = event.order.id, status = %other, "no financial action");
                Ok(())
            }
        }
    }

    /// One settlement pass at `now`.
    pub fn settle_due(&mut self, now: DateTime<Utc>) -> SettlementReport {
        settle_due(&mut self.store, &mut self.selector, &self.audit, now)
    }

    /// Admin payout path.
    pub fn initiate_payout(
        &mut self,
        request: &PayoutRequest,
        now: DateTime<Utc>,
    ) -> Result<PayoutReceipt, Error> {
        let receipt = initiate_payout(
            &mut self.store,
            &self.settings,
            &mut self.selector,
            request,
            now,
        )?;
        self.audit.record(AuditEvent {
            actor: Some(request.actor_id),
            action: if receipt.needs_approval {
                AuditAction::PayoutParked
            } else {
                AuditAction::PayoutInitiated
            },
            target_type: "ledger_entry".into(),
            target_id: receipt.transaction_id,
            metadata: json!({
                "amount": request.amount,
                "destination": request.destination,
                "method": request.method,
            }),
            at: now,
        });
        Ok(receipt)
    }

    /// Run the periodic settlement scheduler until cancelled by the caller.
    pub async fn run_scheduler(&mut self) {
        let scheduler = SettlementScheduler::from_settings(&self.settings);
        scheduler
            .run(&mut self.store, &mut self.selector, &self.audit)
            .await;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn flush(&mut self) {
        self.store.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::RecordingAudit;
    use crate::dlq::RecordingDlq;
    use crate::ingestion::CsvReader;
    use crate::notify::LogNotifier;
    use crate::store::InMemoryStore;
    use crate::testing::{reseller, vendor};
    use rust_decimal::Decimal;
    use std::io::Cursor;

    const HEADER: &str = "order_id,previous_status,new_status,vendor_id,customer_id,total,category,delivery_fee,delivery_man_id,referral_code,payment_method";

    fn engine_for(
        csv: &str,
        store: InMemoryStore,
    ) -> Engine<
        CsvReader<Cursor<String>>,
        InMemoryStore,
        RecordingDlq,
        RecordingAudit,
        LogNotifier,
    > {
        let ingestion = CsvReader::new(Cursor::new(format!("{HEADER}\n{csv}"))).unwrap();
        Engine::new(
            ingestion,
            store,
            RecordingDlq::default(),
            RecordingAudit::default(),
            LogNotifier::default(),
            PlatformSettings::default(),
        )
    }

    #[tokio::test]
    async fn delivered_then_refund_round_trip() {
        let mut store = InMemoryStore::new(5);
        store.upsert_account(vendor(100));
        let csv = "\
            1,out for delivery,delivered,100,200,1000,food,,,,wallet\n\
            1,delivered,refund approved,100,200,1000,food,,,,wallet";
        let mut engine = engine_for(csv, store);

        engine.process().await.unwrap();

        let store = engine.store();
        assert!(store.order(1).unwrap().is_processed);
        assert!(store.order(1).unwrap().is_refunded);
        assert_eq!(
            store.account(200).unwrap().wallet_balance,
            Decimal::from(1000u32)
        );
        // Distribution then reversal, both audited.
        assert_eq!(engine.audit.events.borrow().len(), 2);
        assert!(engine.dlq.errors.borrow().is_empty());
    }

    #[tokio::test]
    async fn duplicate_delivery_events_distribute_once() {
        let mut store = InMemoryStore::new(5);
        store.upsert_account(vendor(100));
        let csv = "\
            1,out for delivery,delivered,100,200,1000,food,,,,wallet\n\
            1,out for delivery,delivered,100,200,1000,food,,,,wallet";
        let mut engine = engine_for(csv, store);

        engine.process().await.unwrap();

        assert_eq!(engine.store().entries_for_order(1).len(), 2);
        assert_eq!(engine.audit.events.borrow().len(), 1);
    }

    #[tokio::test]
    async fn ride_completion_pays_reseller_immediately() {
        let mut store = InMemoryStore::new(5);
        store.upsert_account(reseller(100));
        let csv = "5,ride accepted,ride completed,100,200,500,ride,,,,wallet";
        let mut engine = engine_for(csv, store);

        engine.process().await.unwrap();

        assert_eq!(
            engine.store().account(100).unwrap().wallet_balance,
            Decimal::from(465u32)
        );
        assert_eq!(engine.store().platform_balance(), Decimal::from(35u32));
    }

    #[tokio::test]
    async fn bad_rows_and_missing_owners_go_to_the_dlq() {
        let store = InMemoryStore::new(5);
        // Unknown status, then an order whose vendor account is absent.
        let csv = "\
            1,pending,warp drive,100,200,10,food,,,,wallet\n\
            2,out for delivery,delivered,999,200,10,food,,,,wallet";
        let mut engine = engine_for(csv, store);

        engine.process().await.unwrap();

        assert_eq!(engine.dlq.errors.borrow().len(), 2);
        assert!(engine.store().entries_for_order(2).is_empty());
    }

    #[tokio::test]
    async fn intermediate_transitions_are_ignored() {
        let mut store = InMemoryStore::new(5);
        store.upsert_account(vendor(100));
        let csv = "\
            1,pending,confirmed,100,200,1000,food,,,,wallet\n\
            1,confirmed,preparing,100,200,1000,food,,,,wallet\n\
            1,preparing,out for delivery,100,200,1000,food,,,,wallet";
        let mut engine = engine_for(csv, store);

        engine.process().await.unwrap();

        assert!(engine.store().entries_for_order(1).is_empty());
        assert!(!engine.store().order(1).unwrap().is_processed);
    }

    #[test]
    fn payout_records_audit_with_actor() {
        let mut store = InMemoryStore::new(5);
        store.commit(
            crate::domain::LedgerBatch {
                shard_credits: vec![(0, Decimal::from(20_000u32))],
                ..Default::default()
            },
            Utc::now(),
        );
        let mut engine = engine_for("", store);

        let receipt = engine
            .initiate_payout(
                &crate::payout::PayoutRequest {
                    amount: Decimal::from(15_000u32),
                    destination: "platform-bank".into(),
                    method: "bank_transfer".into(),
                    actor_id: 1,
                    actor_role: crate::payout::ActorRole::Admin,
                },
                Utc::now(),
            )
            .unwrap();

        assert!(receipt.needs_approval);
        let events = engine.audit.events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::PayoutParked);
        assert_eq!(events[0].actor, Some(1));
    }
}
