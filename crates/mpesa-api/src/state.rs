//! Application state shared across handlers
//!
//! Composes the persistence layer and the domain services (C4-C12) that
//! the handlers delegate to. Built once at startup and shared behind an
//! `Arc` (§5: everything process-wide beyond the token cache and config
//! is persisted, so this struct itself carries no mutable state).

use std::sync::Arc;

use mpesa_activity::ActivityLog;
use mpesa_callback::CallbackDispatcher;
use mpesa_crypto::CredentialVault;
use mpesa_daraja::StkClient;
use mpesa_db::Database;
use mpesa_ingest::IngestCoordinator;
use mpesa_intents::IntentStore;
use mpesa_receipts::ReceiptAssembler;
use mpesa_review::ReviewService;

pub struct AppState {
    pub db: Arc<Database>,
    /// Separate from the vault `StkClient` owns internally; used to
    /// encrypt secrets on the way in at `/daraja/configure` (§4.1, §4.4).
    pub vault: Arc<CredentialVault>,
    pub stk: Arc<StkClient>,
    pub intents: Arc<dyn IntentStore>,
    pub callback: Arc<CallbackDispatcher>,
    pub review: Arc<ReviewService>,
    pub ingest: Arc<IngestCoordinator>,
    pub receipts: Arc<ReceiptAssembler>,
    pub activity: Arc<dyn ActivityLog>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: Arc<Database>,
        vault: Arc<CredentialVault>,
        stk: Arc<StkClient>,
        intents: Arc<dyn IntentStore>,
        callback: Arc<CallbackDispatcher>,
        review: Arc<ReviewService>,
        ingest: Arc<IngestCoordinator>,
        receipts: Arc<ReceiptAssembler>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            db,
            vault,
            stk,
            intents,
            callback,
            review,
            ingest,
            receipts,
            activity,
        }
    }
}
