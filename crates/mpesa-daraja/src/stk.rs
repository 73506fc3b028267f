//! Daraja STK Push client (C5, §4.5)

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Local;
use mpesa_crypto::CredentialVault;
use mpesa_types::{DarajaConfig, PaymentIntent};
use serde::{Deserialize, Serialize};

use crate::auth::{DarajaAuth, DarajaCredentials};
use crate::error::{DarajaError, DarajaResult};

/// Default outbound request timeout (§5: 30s).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StkClient {
    http: reqwest::Client,
    auth: DarajaAuth,
    vault: CredentialVault,
    callback_url: String,
    request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StkInitiateResult {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkStatusResponse {
    #[serde(rename = "ResultCode")]
    pub result_code: String,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
}

#[derive(Serialize)]
struct StkPushRequestBody {
    #[serde(rename = "BusinessShortCode")]
    business_short_code: String,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "TransactionType")]
    transaction_type: String,
    #[serde(rename = "Amount")]
    amount: u64,
    #[serde(rename = "PartyA")]
    party_a: String,
    #[serde(rename = "PartyB")]
    party_b: String,
    #[serde(rename = "PhoneNumber")]
    phone_number: String,
    #[serde(rename = "CallBackURL")]
    call_back_url: String,
    #[serde(rename = "AccountReference")]
    account_reference: String,
    #[serde(rename = "TransactionDesc")]
    transaction_desc: String,
}

#[derive(Deserialize)]
struct StkPushResponseBody {
    #[serde(rename = "ResponseCode")]
    response_code: String,
    #[serde(rename = "ResponseDescription")]
    response_description: String,
    #[serde(rename = "MerchantRequestID")]
    merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    checkout_request_id: Option<String>,
}

#[derive(Serialize)]
struct StkQueryRequestBody {
    #[serde(rename = "BusinessShortCode")]
    business_short_code: String,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "CheckoutRequestID")]
    checkout_request_id: String,
}

impl StkClient {
    pub fn new(auth: DarajaAuth, vault: CredentialVault, callback_url: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(DEFAULT_REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client builds"),
            auth,
            vault,
            callback_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Decrypt via the vault, falling back to the raw value once on
    /// `CredentialCorrupted` (permits migration of legacy plaintext rows).
    fn decrypt_or_fallback(&self, value: &str) -> String {
        if !CredentialVault::is_encrypted(value) {
            return value.to_string();
        }
        match self.vault.decrypt(value) {
            Ok(plain) => plain,
            Err(_) => {
                tracing::warn!("credential decrypt failed, falling back to raw stored value");
                value.to_string()
            }
        }
    }

    pub async fn initiate(
        &self,
        intent: &PaymentIntent,
        daraja: &DarajaConfig,
    ) -> DarajaResult<StkInitiateResult> {
        if !daraja.is_ready() {
            return Err(DarajaError::GatewayNotConfigured);
        }

        let consumer_key = self.decrypt_or_fallback(&daraja.consumer_key);
        let consumer_secret = self.decrypt_or_fallback(&daraja.consumer_secret);
        let passkey = self.decrypt_or_fallback(&daraja.passkey);

        let phone = mpesa_core::normalize(&intent.phone_number)
            .ok_or_else(|| DarajaError::InvalidPhone(intent.phone_number.clone()))?;

        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let password = STANDARD.encode(format!(
            "{}{passkey}{timestamp}",
            daraja.business_short_code
        ));

        let creds = DarajaCredentials {
            consumer_key,
            consumer_secret,
            environment: daraja.environment,
        };
        let token = self.auth.get_token(&creds).await?;

        let body = StkPushRequestBody {
            business_short_code: daraja.business_short_code.clone(),
            password,
            timestamp,
            transaction_type: daraja.business_type.transaction_type().to_string(),
            amount: intent.amount,
            party_a: phone.clone(),
            party_b: daraja.business_short_code.clone(),
            phone_number: phone,
            call_back_url: self.callback_url.clone(),
            account_reference: intent.account_reference.clone(),
            transaction_desc: intent.transaction_desc.clone(),
        };

        let url = format!(
            "{}/mpesa/stkpush/v1/processrequest",
            daraja.environment.base_url()
        );

        let response = self.send_with_timeout(
            self.http
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send(),
        )
        .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DarajaError::StkRejected(text));
        }

        let parsed: StkPushResponseBody = response
            .json()
            .await
            .map_err(|e| DarajaError::Transport(e.to_string()))?;

        if parsed.response_code != "0" {
            return Err(DarajaError::StkRejected(parsed.response_description));
        }

        Ok(StkInitiateResult {
            merchant_request_id: parsed.merchant_request_id.unwrap_or_default(),
            checkout_request_id: parsed.checkout_request_id.unwrap_or_default(),
        })
    }

    /// Exercises the OAuth leg only, for the `/daraja/test` endpoint (§4.4):
    /// confirms the stored credentials actually mint a token without
    /// placing an STK request.
    pub async fn test_auth(&self, daraja: &DarajaConfig) -> DarajaResult<()> {
        if !daraja.is_ready() {
            return Err(DarajaError::GatewayNotConfigured);
        }

        let consumer_key = self.decrypt_or_fallback(&daraja.consumer_key);
        let consumer_secret = self.decrypt_or_fallback(&daraja.consumer_secret);

        let creds = DarajaCredentials {
            consumer_key,
            consumer_secret,
            environment: daraja.environment,
        };
        self.auth.get_token(&creds).await?;
        Ok(())
    }

    pub async fn query_status(
        &self,
        daraja: &DarajaConfig,
        checkout_request_id: &str,
    ) -> DarajaResult<StkStatusResponse> {
        let passkey = self.decrypt_or_fallback(&daraja.passkey);
        let consumer_key = self.decrypt_or_fallback(&daraja.consumer_key);
        let consumer_secret = self.decrypt_or_fallback(&daraja.consumer_secret);

        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let password = STANDARD.encode(format!(
            "{}{passkey}{timestamp}",
            daraja.business_short_code
        ));

        let creds = DarajaCredentials {
            consumer_key,
            consumer_secret,
            environment: daraja.environment,
        };
        let token = self.auth.get_token(&creds).await?;

        let body = StkQueryRequestBody {
            business_short_code: daraja.business_short_code.clone(),
            password,
            timestamp,
            checkout_request_id: checkout_request_id.to_string(),
        };

        let url = format!(
            "{}/mpesa/stkpushquery/v1/query",
            daraja.environment.base_url()
        );

        let response = self.send_with_timeout(
            self.http
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send(),
        )
        .await?;

        response
            .json()
            .await
            .map_err(|e| DarajaError::Transport(e.to_string()))
    }

    async fn send_with_timeout(
        &self,
        fut: impl std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    ) -> DarajaResult<reqwest::Response> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(DarajaError::Transport(e.to_string())),
            Err(_) => Err(DarajaError::Timeout { retryable: true }),
        }
    }
}

/// Authoritative Daraja result-code → meaning mapping (§4.5).
pub fn describe_result_code(code: i32) -> &'static str {
    match code {
        0 => "success",
        1 => "insufficient funds",
        17 | 1032 => "user cancelled",
        1037 => "timeout (PIN not entered)",
        26 => "system busy",
        2001 => "invalid initiator",
        4999 => "still processing",
        _ => "failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_code_mapping_matches_table() {
        assert_eq!(describe_result_code(0), "success");
        assert_eq!(describe_result_code(1), "insufficient funds");
        assert_eq!(describe_result_code(17), "user cancelled");
        assert_eq!(describe_result_code(1032), "user cancelled");
        assert_eq!(describe_result_code(1037), "timeout (PIN not entered)");
        assert_eq!(describe_result_code(26), "system busy");
        assert_eq!(describe_result_code(2001), "invalid initiator");
        assert_eq!(describe_result_code(4999), "still processing");
        assert_eq!(describe_result_code(9999), "failure");
    }
}
