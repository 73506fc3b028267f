//! Daraja STK callback and timeout dispatcher (C9, §4.9)

mod dispatcher;
mod envelope;
mod ports;

pub use dispatcher::{CallbackDispatcher, DispatchOutcome, DispatchStatus, TIMEOUT_RESULT_CODE};
pub use envelope::{CallbackEnvelope, CallbackItem, CallbackMetadata, StkCallback, SuccessMetadata};
pub use ports::{CallbackLogSink, PaymentHistoryWriter, TenantLookup};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mpesa_activity::{ActivityLog, EmailSink, InMemoryActivityLog, LoggingEmailSink};
    use mpesa_intents::InMemoryIntentStore;
    use mpesa_types::{
        CheckoutRequestId, IntentId, IntentStatus, LandlordId, PaymentHistory, PaymentIntent,
        PaymentMethod, PaymentStatus, Result, Tenant, TenantId,
    };
    use std::sync::{Arc, Mutex};

    struct RecordingLog {
        entries: Mutex<Vec<(Option<String>, i32)>>,
    }

    #[async_trait]
    impl CallbackLogSink for RecordingLog {
        async fn append(
            &self,
            _merchant_request_id: Option<String>,
            checkout_request_id: Option<String>,
            result_code: i32,
            _result_desc: String,
            _raw_payload: serde_json::Value,
        ) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .push((checkout_request_id, result_code));
            Ok(())
        }
    }

    struct FixedTenant(Tenant);

    #[async_trait]
    impl TenantLookup for FixedTenant {
        async fn find(&self, _id: TenantId) -> Option<Tenant> {
            Some(self.0.clone())
        }
    }

    struct RecordingHistory {
        created: Mutex<Vec<PaymentHistory>>,
    }

    #[async_trait]
    impl PaymentHistoryWriter for RecordingHistory {
        async fn settle_existing(
            &self,
            _bill_id: &str,
            transaction_id: String,
            note: String,
        ) -> Result<PaymentHistory> {
            let history = sample_history(Some(transaction_id), note);
            self.created.lock().unwrap().push(history.clone());
            Ok(history)
        }

        async fn derive_new(
            &self,
            _tenant: &Tenant,
            _landlord_id: LandlordId,
            amount: u64,
            transaction_id: String,
            _occurred_at: DateTime<Utc>,
        ) -> Result<PaymentHistory> {
            let mut history = sample_history(Some(transaction_id), String::new());
            history.amount = amount;
            self.created.lock().unwrap().push(history.clone());
            Ok(history)
        }
    }

    fn sample_history(transaction_id: Option<String>, notes: String) -> PaymentHistory {
        PaymentHistory {
            id: mpesa_types::PaymentHistoryId::new(),
            tenant_id: TenantId::new(),
            landlord_id: LandlordId::new(),
            property_id: None,
            amount: 5000,
            payment_date: Utc::now(),
            for_month: 7,
            for_year: 2026,
            monthly_rent: 5000,
            payment_method: PaymentMethod::Mpesa,
            status: PaymentStatus::Completed,
            notes,
            utility_charges: Vec::new(),
            total_utility_cost: 0.0,
            transaction_id,
            created_at: Utc::now(),
        }
    }

    fn sample_intent(checkout: &str) -> PaymentIntent {
        let now = Utc::now();
        PaymentIntent {
            id: IntentId::new(),
            landlord_id: LandlordId::new(),
            tenant_id: TenantId::new(),
            amount: 5000,
            phone_number: "254712345678".to_string(),
            payment_reference: "RE-1".to_string(),
            account_reference: "T001-JUL".to_string(),
            transaction_desc: "Rent-JUL".to_string(),
            business_short_code: "123456".to_string(),
            business_type: mpesa_types::landlord::BusinessType::Paybill,
            bill_id: None,
            property_id: None,
            status: IntentStatus::Pending,
            merchant_request_id: Some("mr-1".to_string()),
            checkout_request_id: Some(CheckoutRequestId::from(checkout)),
            transaction_id: None,
            result_code: None,
            result_desc: None,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(120),
            callback_received: false,
            callback_data: None,
            completed_at: None,
        }
    }

    fn success_envelope(checkout: &str) -> serde_json::Value {
        serde_json::json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "mr-1",
                    "CheckoutRequestID": checkout,
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            {"Name": "Amount", "Value": 5000.0},
                            {"Name": "MpesaReceiptNumber", "Value": "QJI12ABC34"},
                            {"Name": "TransactionDate", "Value": 20260731121500i64},
                            {"Name": "PhoneNumber", "Value": 254712345678i64}
                        ]
                    }
                }
            }
        })
    }

    fn setup() -> (
        CallbackDispatcher,
        Arc<InMemoryIntentStore>,
        Arc<RecordingLog>,
        Arc<RecordingHistory>,
        Arc<InMemoryActivityLog>,
    ) {
        let intents = InMemoryIntentStore::new();
        let logs = Arc::new(RecordingLog {
            entries: Mutex::new(Vec::new()),
        });
        let tenant = Tenant {
            id: TenantId::new(),
            full_name: "Jane Doe".to_string(),
            phone: "254712345678".to_string(),
            rent_amount: 5000,
            property_id: None,
            unit_label: Some("A1".to_string()),
            email: Some("jane@example.com".to_string()),
        };
        let tenants = Arc::new(FixedTenant(tenant));
        let history = Arc::new(RecordingHistory {
            created: Mutex::new(Vec::new()),
        });
        let activity = InMemoryActivityLog::new();
        let activity = Arc::new(activity);
        let email: Arc<dyn EmailSink> = Arc::new(LoggingEmailSink);

        let dispatcher = CallbackDispatcher::new(
            intents.clone(),
            logs.clone(),
            tenants.clone(),
            history.clone(),
            activity.clone() as Arc<dyn ActivityLog>,
            email,
        );
        (dispatcher, intents, logs, history, activity)
    }

    #[tokio::test]
    async fn successful_callback_transitions_intent_and_creates_history() {
        let (dispatcher, intents, logs, history, activity) = setup();
        let intent = sample_intent("ws_CO_1");
        intents.create(intent.clone()).await.unwrap();

        let outcome = dispatcher.handle_result(success_envelope("ws_CO_1")).await;
        assert_eq!(outcome.status, DispatchStatus::Accepted);

        let stored = intents.find_by_id(intent.id).await.unwrap();
        assert_eq!(stored.status, IntentStatus::Success);
        assert_eq!(stored.transaction_id.as_deref(), Some("QJI12ABC34"));

        assert_eq!(history.created.lock().unwrap().len(), 1);
        assert_eq!(logs.entries.lock().unwrap().len(), 1);
        assert_eq!(activity.events().await.len(), 2);
    }

    #[tokio::test]
    async fn redelivered_callback_is_a_no_op_on_second_delivery() {
        let (dispatcher, intents, _logs, history, _activity) = setup();
        let intent = sample_intent("ws_CO_2");
        intents.create(intent.clone()).await.unwrap();

        dispatcher.handle_result(success_envelope("ws_CO_2")).await;
        dispatcher.handle_result(success_envelope("ws_CO_2")).await;

        assert_eq!(history.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_envelope_is_rejected_with_bad_request() {
        let (dispatcher, _intents, logs, _history, _activity) = setup();
        let outcome = dispatcher
            .handle_result(serde_json::json!({"not": "a callback"}))
            .await;
        assert_eq!(outcome.status, DispatchStatus::BadRequest);
        assert_eq!(logs.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn callback_for_unknown_intent_is_acknowledged_without_side_effects() {
        let (dispatcher, _intents, _logs, history, _activity) = setup();
        let outcome = dispatcher.handle_result(success_envelope("ws_unknown")).await;
        assert_eq!(outcome.status, DispatchStatus::Accepted);
        assert!(history.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeout_route_transitions_intent_to_timeout_regardless_of_envelope_code() {
        let (dispatcher, intents, _logs, _history, activity) = setup();
        let intent = sample_intent("ws_CO_3");
        intents.create(intent.clone()).await.unwrap();

        let mut envelope = success_envelope("ws_CO_3");
        envelope["Body"]["stkCallback"]["ResultCode"] = serde_json::json!(0);
        let outcome = dispatcher.handle_timeout(envelope).await;
        assert_eq!(outcome.status, DispatchStatus::Accepted);

        let stored = intents.find_by_id(intent.id).await.unwrap();
        assert_eq!(stored.status, IntentStatus::Timeout);
        assert_eq!(stored.result_code, Some(TIMEOUT_RESULT_CODE));
        assert_eq!(activity.events().await.len(), 1);
    }
}
