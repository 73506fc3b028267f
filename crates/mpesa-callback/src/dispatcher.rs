//! Callback dispatch logic (C9, §4.9)

use std::sync::Arc;

use chrono::Utc;
use mpesa_activity::{log_best_effort_failure, ActivityLog, EmailSink};
use mpesa_intents::{IntentStore, TerminalFields};
use mpesa_types::callback_log::MALFORMED_CALLBACK_CODE;
use mpesa_types::{
    ActivityActor, ActivityEvent, ActivityKind, CheckoutRequestId, IntentStatus,
    PaymentReceivedEmail,
};

use crate::envelope::{CallbackEnvelope, StkCallback};
use crate::ports::{CallbackLogSink, PaymentHistoryWriter, TenantLookup};

/// Daraja's timeout result code (§4.9 step 5).
pub const TIMEOUT_RESULT_CODE: i32 = 1037;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Accepted,
    BadRequest,
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub status: DispatchStatus,
    pub body: serde_json::Value,
}

impl DispatchOutcome {
    fn accepted() -> Self {
        Self {
            status: DispatchStatus::Accepted,
            body: serde_json::json!({"ResultCode": 0, "ResultDesc": "Accepted"}),
        }
    }

    fn bad_request() -> Self {
        Self {
            status: DispatchStatus::BadRequest,
            body: serde_json::json!({"ResultCode": 1, "ResultDesc": "Invalid callback shape"}),
        }
    }
}

pub struct CallbackDispatcher {
    intents: Arc<dyn IntentStore>,
    logs: Arc<dyn CallbackLogSink>,
    tenants: Arc<dyn TenantLookup>,
    payment_history: Arc<dyn PaymentHistoryWriter>,
    activity: Arc<dyn ActivityLog>,
    email: Arc<dyn EmailSink>,
}

impl CallbackDispatcher {
    pub fn new(
        intents: Arc<dyn IntentStore>,
        logs: Arc<dyn CallbackLogSink>,
        tenants: Arc<dyn TenantLookup>,
        payment_history: Arc<dyn PaymentHistoryWriter>,
        activity: Arc<dyn ActivityLog>,
        email: Arc<dyn EmailSink>,
    ) -> Self {
        Self {
            intents,
            logs,
            tenants,
            payment_history,
            activity,
            email,
        }
    }

    /// `POST /api/daraja/callback` (§4.9 steps 1-4).
    pub async fn handle_result(&self, raw: serde_json::Value) -> DispatchOutcome {
        let stk = match extract_stk_callback(&raw) {
            Some(stk) => stk,
            None => {
                let _ = self
                    .logs
                    .append(
                        None,
                        None,
                        MALFORMED_CALLBACK_CODE,
                        "malformed callback envelope".to_string(),
                        raw,
                    )
                    .await;
                return DispatchOutcome::bad_request();
            }
        };

        self.process(stk, raw).await
    }

    /// `POST /api/daraja/timeout` (§4.9 step 5): a parallel route that
    /// always transitions to `timeout` with result code 1037, regardless
    /// of what the envelope's own `ResultCode` says.
    pub async fn handle_timeout(&self, raw: serde_json::Value) -> DispatchOutcome {
        let mut stk = match extract_stk_callback(&raw) {
            Some(stk) => stk,
            None => {
                let _ = self
                    .logs
                    .append(
                        None,
                        None,
                        MALFORMED_CALLBACK_CODE,
                        "malformed timeout envelope".to_string(),
                        raw,
                    )
                    .await;
                return DispatchOutcome::bad_request();
            }
        };
        stk.result_code = TIMEOUT_RESULT_CODE;
        stk.result_desc = "Timeout".to_string();

        self.process(stk, raw).await
    }

    async fn process(&self, stk: StkCallback, raw: serde_json::Value) -> DispatchOutcome {
        let _ = self
            .logs
            .append(
                Some(stk.merchant_request_id.clone()),
                Some(stk.checkout_request_id.clone()),
                stk.result_code,
                stk.result_desc.clone(),
                raw,
            )
            .await;

        let checkout = CheckoutRequestId::from(stk.checkout_request_id.clone());
        let Some(intent) = self.intents.find_by_checkout(&checkout).await else {
            tracing::debug!(checkout_request_id = %checkout, "callback for unknown intent, acknowledging");
            return DispatchOutcome::accepted();
        };

        if stk.result_code == 0 {
            self.handle_success(intent, &checkout, &stk).await;
        } else if stk.result_code == TIMEOUT_RESULT_CODE {
            self.handle_terminal_failure(&checkout, &intent, IntentStatus::Timeout, &stk)
                .await;
        } else {
            self.handle_terminal_failure(&checkout, &intent, IntentStatus::Failed, &stk)
                .await;
        }

        DispatchOutcome::accepted()
    }

    async fn handle_success(
        &self,
        intent: mpesa_types::PaymentIntent,
        checkout: &CheckoutRequestId,
        stk: &StkCallback,
    ) {
        let metadata = stk
            .callback_metadata
            .as_ref()
            .map(|m| m.extract())
            .unwrap_or_default();
        let receipt = metadata.receipt_number.clone().unwrap_or_default();

        let fields = TerminalFields {
            transaction_id: metadata.receipt_number.clone(),
            result_code: Some(0),
            result_desc: Some(stk.result_desc.clone()),
            callback_data: Some(serde_json::json!({
                "receiptNumber": metadata.receipt_number,
                "transactionDate": metadata.transaction_date,
                "amount": metadata.amount,
                "phoneNumber": metadata.phone_number,
            })),
        };

        let transitioned = match self
            .intents
            .transition_terminal(checkout, IntentStatus::Success, fields)
            .await
        {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "failed to transition intent to success");
                return;
            }
        };
        if !transitioned {
            tracing::debug!(checkout_request_id = %checkout, "redelivered success callback, ignored");
            return;
        }

        let amount = metadata
            .amount
            .map(|a| a.round() as u64)
            .unwrap_or(intent.amount);
        let occurred_at = Utc::now();

        let history = if let Some(bill_id) = &intent.bill_id {
            self.payment_history
                .settle_existing(bill_id, receipt.clone(), format!("M-Pesa payment: {receipt}"))
                .await
        } else {
            match self.tenants.find(intent.tenant_id).await {
                Some(ref tenant) => {
                    self.payment_history
                        .derive_new(tenant, intent.landlord_id, amount, receipt.clone(), occurred_at)
                        .await
                }
                None => {
                    tracing::warn!(tenant_id = %intent.tenant_id, "tenant snapshot missing for settled intent");
                    return;
                }
            }
        };

        let history = match history {
            Ok(h) => h,
            Err(e) => {
                log_best_effort_failure("payment_history", &e);
                return;
            }
        };

        let _ = self
            .activity
            .record(ActivityEvent {
                actor: ActivityActor::Landlord(intent.landlord_id),
                kind: ActivityKind::PaymentReceived,
                metadata: serde_json::json!({"amount": amount, "receiptNumber": receipt}),
                occurred_at,
            })
            .await;
        let _ = self
            .activity
            .record(ActivityEvent {
                actor: ActivityActor::Tenant(intent.tenant_id),
                kind: ActivityKind::PaymentProcessed,
                metadata: serde_json::json!({"amount": amount, "receiptNumber": receipt}),
                occurred_at,
            })
            .await;

        self.notify_tenant(intent.tenant_id, &history, &receipt, occurred_at)
            .await;
    }

    async fn notify_tenant(
        &self,
        tenant_id: mpesa_types::TenantId,
        history: &mpesa_types::PaymentHistory,
        receipt: &str,
        occurred_at: chrono::DateTime<Utc>,
    ) {
        let Some(tenant) = self.tenants.find(tenant_id).await else {
            return;
        };
        let Some(tenant_email) = tenant.email.clone() else {
            return;
        };

        let email = PaymentReceivedEmail {
            tenant_name: tenant.full_name.clone(),
            tenant_email,
            amount: history.amount,
            payment_date: occurred_at,
            receipt_number: receipt.to_string(),
            property_name: None,
            unit_number: tenant.unit_label.clone(),
            for_period: format!("{}/{}", history.for_month, history.for_year),
        };

        if let Err(e) = self.email.send_payment_received(email).await {
            log_best_effort_failure("payment_received_email", &e);
        }
    }

    async fn handle_terminal_failure(
        &self,
        checkout: &CheckoutRequestId,
        intent: &mpesa_types::PaymentIntent,
        status: IntentStatus,
        stk: &StkCallback,
    ) {
        let fields = TerminalFields {
            transaction_id: None,
            result_code: Some(stk.result_code),
            result_desc: Some(stk.result_desc.clone()),
            callback_data: None,
        };

        let transitioned = match self.intents.transition_terminal(checkout, status, fields).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %e, "failed to transition intent to a failure state");
                return;
            }
        };
        if !transitioned {
            tracing::debug!(checkout_request_id = %checkout, "redelivered failure callback, ignored");
            return;
        }

        let _ = self
            .activity
            .record(ActivityEvent {
                actor: ActivityActor::Tenant(intent.tenant_id),
                kind: ActivityKind::PaymentFailed,
                metadata: serde_json::json!({
                    "resultCode": stk.result_code,
                    "resultDesc": stk.result_desc,
                }),
                occurred_at: Utc::now(),
            })
            .await;
    }
}

fn extract_stk_callback(raw: &serde_json::Value) -> Option<StkCallback> {
    let envelope: CallbackEnvelope = serde_json::from_value(raw.clone()).ok()?;
    Some(envelope.body?.stk_callback)
}
