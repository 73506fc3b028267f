//! Statement text parser (C6, §4.6)
//!
//! Extracts "Paid In" transactions from raw M-Pesa statement text. Records
//! span two consecutive lines; if the second line doesn't match one of the
//! known counterparty shapes, the whole record is discarded rather than
//! emitted with missing fields.

use chrono::NaiveDateTime;
use mpesa_types::statement::ParsedTransaction;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE1: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<receipt>\S+)\s+(?P<date>\d{4}-\d{2}-\d{2})\s+(?P<time>\d{2}:\d{2}:\d{2})\s+(?P<details>.+?)\s+(?:completed|pending|failed)\s+(?P<amount1>-?[\d,]+\.\d{2})\s+(?P<amount2>-?[\d,]+\.\d{2})\s*$",
    )
    .expect("LINE1 regex is valid")
});

// Ordered: first match wins (§4.6).
static LINE2_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^to\s*-\s*(?P<phone>0\d*\*+(?P<last3>\d{3}))\s+(?P<name>.+)$").unwrap(),
        Regex::new(r"(?i)^to\s*-\s*(?P<phone>254[\dXx]*\*+(?P<last3>\d{3}))\s+(?P<name>.+)$").unwrap(),
        Regex::new(r"(?i)^(?P<phone>0\*+(?P<last3>\d{3}))\s+(?P<name>.+)$").unwrap(),
        Regex::new(r"(?i)^(?P<phone>254[Xx]+(?P<last3>\d{3}))\s*-\s*(?P<name>.+)$").unwrap(),
    ]
});

#[derive(Debug, Clone, Default)]
pub struct StatementSummary {
    pub total_transactions: usize,
    pub total_amount: f64,
    pub unique_senders: usize,
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// Parse raw statement text into an ordered list of "Paid In" transactions.
pub fn parse(raw_text: &str) -> Vec<ParsedTransaction> {
    let lines: Vec<&str> = raw_text.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(head) = LINE1.captures(lines[i]) else {
            i += 1;
            continue;
        };

        let amount1: f64 = parse_amount(&head["amount1"]);
        if amount1 <= 0.0 {
            // withdrawal, not a Paid-In record — skip the whole line pair
            i += if i + 1 < lines.len() { 2 } else { 1 };
            continue;
        }

        let Some(next_line) = lines.get(i + 1) else {
            i += 1;
            continue;
        };
        let Some((phone, last3, name)) = match_line2(next_line) else {
            // ParseFailed: line 1 matched but line 2 didn't — discard record,
            // only consume line 1.
            i += 1;
            continue;
        };

        let amount2: f64 = parse_amount(&head["amount2"]);
        let completion_time = NaiveDateTime::parse_from_str(
            &format!("{} {}", &head["date"], &head["time"]),
            "%Y-%m-%d %H:%M:%S",
        )
        .expect("LINE1 regex guarantees a parseable date/time");

        out.push(ParsedTransaction {
            receipt_no: head["receipt"].to_string(),
            completion_time,
            details: head["details"].trim().to_string(),
            sender_phone: phone,
            sender_phone_last3: last3,
            sender_name: title_case(&name),
            amount: amount1,
            balance: amount2,
        });

        i += 2;
    }
    out
}

pub fn summarize(transactions: &[ParsedTransaction]) -> StatementSummary {
    if transactions.is_empty() {
        return StatementSummary::default();
    }
    let total_amount = transactions.iter().map(|t| t.amount).sum();
    let unique_senders = transactions
        .iter()
        .map(|t| t.sender_phone_last3.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();
    let min = transactions.iter().map(|t| t.completion_time).min().unwrap();
    let max = transactions.iter().map(|t| t.completion_time).max().unwrap();
    StatementSummary {
        total_transactions: transactions.len(),
        total_amount,
        unique_senders,
        date_range: Some((min, max)),
    }
}

fn match_line2(line: &str) -> Option<(String, String, String)> {
    let trimmed = line.trim();
    for re in LINE2_PATTERNS.iter() {
        if let Some(caps) = re.captures(trimmed) {
            return Some((
                caps["phone"].to_string(),
                caps["last3"].to_string(),
                caps["name"].trim().to_string(),
            ));
        }
    }
    None
}

fn parse_amount(raw: &str) -> f64 {
    raw.replace(',', "").parse().unwrap_or(0.0)
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_paid_in_record() {
        let text = "\
QJI7XYZ123  2026-07-01  09:15:32  Funds received from  Completed  5,000.00  12,300.50
to - 0****393 JOHN KAMAU";
        let txs = parse(text);
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.receipt_no, "QJI7XYZ123");
        assert_eq!(tx.sender_phone_last3, "393");
        assert_eq!(tx.sender_name, "John Kamau");
        assert_eq!(tx.amount, 5000.00);
        assert_eq!(tx.balance, 12300.50);
    }

    #[test]
    fn skips_withdrawal_records_with_non_positive_paid_in() {
        let text = "\
QJI7XYZ124  2026-07-01  09:16:00  Pay Bill to XYZ  Completed  0.00  7,300.50
to - 0****393 JOHN KAMAU";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn discards_record_when_line2_does_not_match_any_shape() {
        let text = "\
QJI7XYZ125  2026-07-01  09:17:00  Funds received  Completed  200.00  7,500.50
this line is not a counterparty line at all";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn matches_masked_phone_with_visible_digit_before_the_mask() {
        let text = "\
TK2RJ91M5Z 2025-11-02 21:05:35 Customer Transfer Fuliza MPesa Completed 80.00 0.00
to - 07******892 mary muchina";
        let txs = parse(text);
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.receipt_no, "TK2RJ91M5Z");
        assert_eq!(tx.amount, 80.0);
        assert_eq!(tx.sender_phone_last3, "892");
        assert_eq!(tx.sender_name, "Mary Muchina");
    }

    #[test]
    fn matches_254_masked_alternative_form() {
        let text = "\
QJI7XYZ126  2026-07-01  09:18:00  Funds received  Completed  1,200.00  8,700.50
to - 254***456 MARY WANJIKU";
        let txs = parse(text);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].sender_phone_last3, "456");
    }

    #[test]
    fn matches_test_alt_form_with_leading_254_and_trailing_dash_name() {
        let text = "\
QJI7XYZ127  2026-07-01  09:19:00  Funds received  Completed  300.00  9,000.00
254XXXXX789 - PETER OTIENO";
        let txs = parse(text);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].sender_phone_last3, "789");
        assert_eq!(txs[0].sender_name, "Peter Otieno");
    }

    #[test]
    fn summary_aggregates_across_transactions() {
        let text = "\
QJI1  2026-07-01  09:00:00  A  Completed  100.00  1.00
to - 0***111 A A
QJI2  2026-07-02  10:00:00  B  Completed  200.00  2.00
to - 0***222 B B";
        let txs = parse(text);
        let summary = summarize(&txs);
        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.total_amount, 300.0);
        assert_eq!(summary.unique_senders, 2);
        assert!(summary.date_range.is_some());
    }
}
