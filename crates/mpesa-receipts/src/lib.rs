//! Receipt assembly (C12, §4.12)
//!
//! Builds the receipt record handed to the external PDF sink from a
//! completed `PaymentHistory`. Pure transformation plus a thin delivery
//! step; no persistence of its own.

use std::sync::Arc;

use mpesa_activity::ReceiptSink;
use mpesa_types::payment_history::HISTORICAL_DEBT_PREFIX;
use mpesa_types::{MpesaError, PaymentHistory, PaymentStatus, Receipt, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static HISTORICAL_DEBT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{}(?P<amount>[\d,]+(?:\.\d+)?) \((?P<details>[^)]*)\)",
        regex::escape(HISTORICAL_DEBT_PREFIX)
    ))
    .expect("historical debt pattern is valid")
});

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

pub struct ReceiptAssembler {
    sink: Arc<dyn ReceiptSink>,
}

impl ReceiptAssembler {
    pub fn new(sink: Arc<dyn ReceiptSink>) -> Self {
        Self { sink }
    }

    /// Builds the receipt record. Callers that only need the shape (e.g.
    /// for a preview) can call this without delivering it.
    pub fn assemble(&self, history: &PaymentHistory) -> Result<Receipt> {
        if history.status != PaymentStatus::Completed {
            return Err(MpesaError::invalid_input(
                "status",
                "a receipt is only issuable for a completed payment",
            ));
        }

        let (historical_debt, historical_debt_details) = parse_historical_debt(&history.notes);
        let current_month_rent = if historical_debt > 0.0 {
            history.monthly_rent as f64 - historical_debt
        } else {
            history.monthly_rent as f64
        };

        Ok(Receipt {
            payment_history_id: history.id,
            tenant_id: history.tenant_id,
            landlord_id: history.landlord_id,
            property_id: history.property_id,
            receipt_number: receipt_number(history.id),
            payment_period: payment_period(history.for_month, history.for_year),
            amount: history.amount,
            utility_charges: history.utility_charges.clone(),
            total_utility_cost: history.total_utility_cost,
            historical_debt,
            historical_debt_details,
            current_month_rent,
            generated_at: chrono::Utc::now(),
        })
    }

    /// Assembles and hands the receipt to the external sink.
    pub async fn issue(&self, history: &PaymentHistory) -> Result<Receipt> {
        let receipt = self.assemble(history)?;
        self.sink.deliver(receipt.clone()).await?;
        Ok(receipt)
    }
}

fn receipt_number(id: mpesa_types::PaymentHistoryId) -> String {
    let hex = id.0.simple().to_string();
    hex[..12].to_uppercase()
}

fn payment_period(for_month: u8, for_year: i32) -> String {
    let name = MONTH_NAMES
        .get((for_month.saturating_sub(1)) as usize)
        .copied()
        .unwrap_or("Unknown");
    format!("{name} {for_year}")
}

fn parse_historical_debt(notes: &str) -> (f64, Option<String>) {
    match HISTORICAL_DEBT.captures(notes) {
        Some(caps) => {
            let amount: f64 = caps["amount"].replace(',', "").parse().unwrap_or(0.0);
            (amount, Some(caps["details"].to_string()))
        }
        None => (0.0, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mpesa_types::{LandlordId, PaymentHistoryId, PaymentMethod, TenantId};
    use std::sync::Mutex;

    struct RecordingSink {
        delivered: Mutex<Vec<Receipt>>,
    }

    #[async_trait]
    impl ReceiptSink for RecordingSink {
        async fn deliver(&self, receipt: Receipt) -> Result<()> {
            self.delivered.lock().unwrap().push(receipt);
            Ok(())
        }
    }

    fn history(notes: &str, status: PaymentStatus) -> PaymentHistory {
        PaymentHistory {
            id: PaymentHistoryId::new(),
            tenant_id: TenantId::new(),
            landlord_id: LandlordId::new(),
            property_id: None,
            amount: 5000,
            payment_date: chrono::Utc::now(),
            for_month: 7,
            for_year: 2026,
            monthly_rent: 5000,
            payment_method: PaymentMethod::Mpesa,
            status,
            notes: notes.to_string(),
            utility_charges: Vec::new(),
            total_utility_cost: 0.0,
            transaction_id: Some("QJI1ABCD23".to_string()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn receipt_number_is_the_first_12_uppercase_hex_chars_of_the_id() {
        let h = history("", PaymentStatus::Completed);
        let assembler = ReceiptAssembler::new(Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        }));
        let receipt = assembler.assemble(&h).unwrap();
        assert_eq!(receipt.receipt_number.len(), 12);
        assert_eq!(receipt.receipt_number, receipt.receipt_number.to_uppercase());
        assert_eq!(receipt.payment_period, "July 2026");
    }

    #[test]
    fn historical_debt_marker_is_parsed_and_subtracted_from_current_rent() {
        let h = history(
            "Includes historical debt: KSH 1,200.50 (June rent shortfall)",
            PaymentStatus::Completed,
        );
        let assembler = ReceiptAssembler::new(Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        }));
        let receipt = assembler.assemble(&h).unwrap();
        assert_eq!(receipt.historical_debt, 1200.50);
        assert_eq!(receipt.historical_debt_details.as_deref(), Some("June rent shortfall"));
        assert_eq!(receipt.current_month_rent, 5000.0 - 1200.50);
    }

    #[test]
    fn no_marker_means_zero_historical_debt_and_full_rent() {
        let h = history("M-Pesa payment: QJI1ABCD23", PaymentStatus::Completed);
        let assembler = ReceiptAssembler::new(Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        }));
        let receipt = assembler.assemble(&h).unwrap();
        assert_eq!(receipt.historical_debt, 0.0);
        assert!(receipt.historical_debt_details.is_none());
        assert_eq!(receipt.current_month_rent, 5000.0);
    }

    #[tokio::test]
    async fn issuing_a_pending_payment_is_rejected() {
        let h = history("", PaymentStatus::Pending);
        let sink = Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        });
        let assembler = ReceiptAssembler::new(sink.clone());
        let err = assembler.issue(&h).await.unwrap_err();
        assert!(matches!(err, MpesaError::InvalidInput { .. }));
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn issuing_a_completed_payment_delivers_to_the_sink() {
        let h = history("", PaymentStatus::Completed);
        let sink = Arc::new(RecordingSink {
            delivered: Mutex::new(Vec::new()),
        });
        let assembler = ReceiptAssembler::new(sink.clone());
        assembler.issue(&h).await.unwrap();
        assert_eq!(sink.delivered.lock().unwrap().len(), 1);
    }
}
