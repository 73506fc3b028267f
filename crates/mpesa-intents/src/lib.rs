//! Payment intent store (C8, §4.8)
//!
//! Defines the store contract as a trait so the API/callback layers can
//! depend on it without committing to a backend. `InMemoryIntentStore` is
//! the reference implementation used by tests and local development; the
//! Postgres-backed implementation lives in `mpesa-db` (§5: "nothing else
//! mutable is process-wide; all other state is persisted").

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mpesa_types::{CheckoutRequestId, IntentId, IntentStatus, MpesaError, PaymentIntent, Result};
use tokio::sync::RwLock;

/// Fields a terminal transition may set, beyond the new status.
#[derive(Debug, Clone, Default)]
pub struct TerminalFields {
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub result_desc: Option<String>,
    pub callback_data: Option<serde_json::Value>,
}

#[async_trait]
pub trait IntentStore: Send + Sync {
    async fn create(&self, intent: PaymentIntent) -> Result<PaymentIntent>;

    async fn attach_checkout(
        &self,
        intent_id: IntentId,
        merchant_request_id: String,
        checkout_request_id: CheckoutRequestId,
    ) -> Result<PaymentIntent>;

    async fn find_by_checkout(&self, checkout: &CheckoutRequestId) -> Option<PaymentIntent>;

    async fn find_by_id(&self, id: IntentId) -> Option<PaymentIntent>;

    /// Set a terminal status exactly once. Returns `true` if a transition
    /// happened, `false` if the intent was already terminal (redelivery).
    /// The write must be a compare-and-set on `status == pending` (§5).
    async fn transition_terminal(
        &self,
        checkout: &CheckoutRequestId,
        new_status: IntentStatus,
        fields: TerminalFields,
    ) -> Result<bool>;

    /// Reclaim intents that passed their `expiresAt` while still pending.
    async fn reap_expired(&self, now: DateTime<Utc>) -> Vec<IntentId>;
}

#[derive(Default)]
pub struct InMemoryIntentStore {
    by_id: RwLock<HashMap<IntentId, PaymentIntent>>,
    by_checkout: RwLock<HashMap<CheckoutRequestId, IntentId>>,
}

impl InMemoryIntentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl IntentStore for InMemoryIntentStore {
    async fn create(&self, intent: PaymentIntent) -> Result<PaymentIntent> {
        if let Some(checkout) = intent.checkout_request_id.clone() {
            self.by_checkout.write().await.insert(checkout, intent.id);
        }
        self.by_id.write().await.insert(intent.id, intent.clone());
        Ok(intent)
    }

    async fn attach_checkout(
        &self,
        intent_id: IntentId,
        merchant_request_id: String,
        checkout_request_id: CheckoutRequestId,
    ) -> Result<PaymentIntent> {
        let mut by_id = self.by_id.write().await;
        let intent = by_id
            .get_mut(&intent_id)
            .ok_or_else(|| MpesaError::NotFound(intent_id.to_string()))?;
        intent.merchant_request_id = Some(merchant_request_id);
        intent.checkout_request_id = Some(checkout_request_id.clone());
        let updated = intent.clone();
        drop(by_id);
        self.by_checkout
            .write()
            .await
            .insert(checkout_request_id, intent_id);
        Ok(updated)
    }

    async fn find_by_checkout(&self, checkout: &CheckoutRequestId) -> Option<PaymentIntent> {
        let id = *self.by_checkout.read().await.get(checkout)?;
        self.by_id.read().await.get(&id).cloned()
    }

    async fn find_by_id(&self, id: IntentId) -> Option<PaymentIntent> {
        self.by_id.read().await.get(&id).cloned()
    }

    async fn transition_terminal(
        &self,
        checkout: &CheckoutRequestId,
        new_status: IntentStatus,
        fields: TerminalFields,
    ) -> Result<bool> {
        debug_assert!(new_status.is_terminal());
        let id = *self
            .by_checkout
            .read()
            .await
            .get(checkout)
            .ok_or_else(|| MpesaError::NotFound(checkout.to_string()))?;

        let mut by_id = self.by_id.write().await;
        let intent = by_id
            .get_mut(&id)
            .ok_or_else(|| MpesaError::NotFound(id.to_string()))?;

        if intent.status != IntentStatus::Pending {
            tracing::debug!(intent_id = %id, "duplicate terminal transition, ignored");
            return Ok(false);
        }

        intent.status = new_status;
        intent.transaction_id = fields.transaction_id;
        intent.result_code = fields.result_code;
        intent.result_desc = fields.result_desc;
        intent.callback_received = true;
        intent.callback_data = fields.callback_data;
        intent.completed_at = Some(Utc::now());
        Ok(true)
    }

    async fn reap_expired(&self, now: DateTime<Utc>) -> Vec<IntentId> {
        let mut by_id = self.by_id.write().await;
        let mut reaped = Vec::new();
        for intent in by_id.values_mut() {
            if intent.is_expired(now) {
                intent.status = IntentStatus::Timeout;
                intent.completed_at = Some(now);
                reaped.push(intent.id);
            }
        }
        reaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpesa_types::landlord::BusinessType;
    use mpesa_types::{LandlordId, TenantId};

    fn sample_intent(checkout: Option<&str>) -> PaymentIntent {
        let now = Utc::now();
        PaymentIntent {
            id: IntentId::new(),
            landlord_id: LandlordId::new(),
            tenant_id: TenantId::new(),
            amount: 5000,
            phone_number: "254712345678".to_string(),
            payment_reference: "RE-202607-L001-T001-ABC123".to_string(),
            account_reference: "T001-JUL".to_string(),
            transaction_desc: "Rent-JUL".to_string(),
            business_short_code: "123456".to_string(),
            business_type: BusinessType::Paybill,
            bill_id: None,
            property_id: None,
            status: IntentStatus::Pending,
            merchant_request_id: None,
            checkout_request_id: checkout.map(CheckoutRequestId::from),
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

    #[tokio::test]
    async fn transition_terminal_only_fires_once() {
        let store = InMemoryIntentStore::new();
        let intent = sample_intent(Some("ws_CO_1"));
        store.create(intent.clone()).await.unwrap();
        let checkout = intent.checkout_request_id.unwrap();

        let fields = TerminalFields {
            transaction_id: Some("QJI123".to_string()),
            result_code: Some(0),
            result_desc: Some("Success".to_string()),
            callback_data: None,
        };
        let first = store
            .transition_terminal(&checkout, IntentStatus::Success, fields.clone())
            .await
            .unwrap();
        assert!(first);

        let second = store
            .transition_terminal(&checkout, IntentStatus::Success, fields)
            .await
            .unwrap();
        assert!(!second);
    }

    #[tokio::test]
    async fn find_by_checkout_returns_stored_intent() {
        let store = InMemoryIntentStore::new();
        let intent = sample_intent(Some("ws_CO_2"));
        store.create(intent.clone()).await.unwrap();
        let found = store
            .find_by_checkout(&CheckoutRequestId::from("ws_CO_2"))
            .await
            .unwrap();
        assert_eq!(found.id, intent.id);
    }

    #[tokio::test]
    async fn reap_expired_transitions_stale_pending_intents_to_timeout() {
        let store = InMemoryIntentStore::new();
        let mut intent = sample_intent(Some("ws_CO_3"));
        intent.expires_at = Utc::now() - chrono::Duration::seconds(1);
        store.create(intent.clone()).await.unwrap();

        let reaped = store.reap_expired(Utc::now()).await;
        assert_eq!(reaped, vec![intent.id]);

        let stored = store.find_by_id(intent.id).await.unwrap();
        assert_eq!(stored.status, IntentStatus::Timeout);
    }
}
