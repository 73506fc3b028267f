//! Wire shapes for the Daraja STK callback/timeout envelope (§4.9, §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: Option<CallbackBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i32,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "CallbackMetadata")]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item")]
    pub item: Vec<CallbackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Option<serde_json::Value>,
}

/// The fields C9 pulls out of a successful callback's metadata items.
#[derive(Debug, Clone, Default)]
pub struct SuccessMetadata {
    pub receipt_number: Option<String>,
    pub transaction_date: Option<String>,
    pub amount: Option<f64>,
    pub phone_number: Option<String>,
}

impl CallbackMetadata {
    pub fn extract(&self) -> SuccessMetadata {
        let mut out = SuccessMetadata::default();
        for item in &self.item {
            let Some(value) = &item.value else { continue };
            match item.name.as_str() {
                "MpesaReceiptNumber" => out.receipt_number = value.as_str().map(str::to_string),
                "TransactionDate" => {
                    out.transaction_date = Some(match value {
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                }
                "Amount" => out.amount = value.as_f64(),
                "PhoneNumber" => {
                    out.phone_number = Some(match value {
                        serde_json::Value::Number(n) => n.to_string(),
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                }
                _ => {}
            }
        }
        out
    }
}
