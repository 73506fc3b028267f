//! Transaction match review DTOs (C10, §4.10)

use serde::Deserialize;
use uuid::Uuid;

pub use super::statements::TransactionMatchResponse;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApproveMatchRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RejectMatchRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatchRequest {
    pub tenant_id: Uuid,
}
