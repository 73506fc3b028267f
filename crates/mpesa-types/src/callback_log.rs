//! Append-only log of inbound Daraja callbacks (§3, §4.9)

use crate::ids::CallbackLogId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel result code used when a callback payload could not be parsed.
pub const MALFORMED_CALLBACK_CODE: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackLog {
    pub id: CallbackLogId,
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub result_code: i32,
    pub result_desc: String,
    pub raw_payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}
