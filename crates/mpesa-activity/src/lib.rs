//! Collaborator interfaces: activity log, tenant email, receipt delivery.
//!
//! The core only shapes these payloads; durable storage, SMTP delivery, and
//! PDF rendering are out of scope (§1) and live behind these traits so the
//! callback/review/receipt paths can emit events without depending on a
//! concrete transport.

use async_trait::async_trait;
use mpesa_types::{ActivityEvent, MpesaError, PaymentReceivedEmail, Receipt, Result};

#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, event: ActivityEvent) -> Result<()>;
}

#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send_payment_received(&self, email: PaymentReceivedEmail) -> Result<()>;
}

#[async_trait]
pub trait ReceiptSink: Send + Sync {
    async fn deliver(&self, receipt: Receipt) -> Result<()>;
}

/// In-memory `ActivityLog` for tests and local development — not a
/// durable store.
#[derive(Default)]
pub struct InMemoryActivityLog {
    events: tokio::sync::RwLock<Vec<ActivityEvent>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ActivityEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record(&self, event: ActivityEvent) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}

/// Email sink that only logs — the real transport (SMTP, SES, …) is out of
/// scope (§1).
#[derive(Default)]
pub struct LoggingEmailSink;

#[async_trait]
impl EmailSink for LoggingEmailSink {
    async fn send_payment_received(&self, email: PaymentReceivedEmail) -> Result<()> {
        tracing::info!(
            tenant_email = %email.tenant_email,
            amount = email.amount,
            receipt_number = %email.receipt_number,
            "payment received email"
        );
        Ok(())
    }
}

/// Receipt sink that only logs — PDF rendering is out of scope (§1).
#[derive(Default)]
pub struct LoggingReceiptSink;

#[async_trait]
impl ReceiptSink for LoggingReceiptSink {
    async fn deliver(&self, receipt: Receipt) -> Result<()> {
        tracing::info!(
            receipt_number = %receipt.receipt_number,
            payment_history_id = %receipt.payment_history_id,
            "receipt delivered"
        );
        Ok(())
    }
}

/// Marks a collaborator call that failed without surfacing to the caller
/// (§4.9: email/activity emission is best-effort).
pub fn log_best_effort_failure(context: &str, err: &MpesaError) {
    tracing::warn!(context, error = %err, "best-effort collaborator call failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mpesa_types::{ActivityActor, ActivityKind, LandlordId};

    #[tokio::test]
    async fn in_memory_activity_log_records_events() {
        let log = InMemoryActivityLog::new();
        log.record(ActivityEvent {
            actor: ActivityActor::Landlord(LandlordId::new()),
            kind: ActivityKind::PaymentReceived,
            metadata: serde_json::json!({"amount": 5000}),
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();
        assert_eq!(log.events().await.len(), 1);
    }
}
