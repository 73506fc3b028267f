//! Deterministic reference/description/idempotency-key generation (C3, §4.3)
//!
//! All generators are deterministic given their inputs; the only
//! randomness is the 6-char suffix on the full payment reference.
//! Truncation to Daraja's field-length limits is mandatory and silent —
//! overflow is not an error.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

const ACCOUNT_REFERENCE_MAX: usize = 13;
const TRANSACTION_DESC_MAX: usize = 20;
const IDEMPOTENCY_KEY_LEN: usize = 32;

/// Truncate a string to `max` characters, respecting UTF-8 boundaries.
fn truncate_to(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Stable 3-digit numeric fingerprint of an opaque id, used where the
/// reference format wants "3 digits" but the id itself is a UUID.
fn digits3(id: &str) -> u16 {
    let digest = Sha256::digest(id.as_bytes());
    let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (value % 1000) as u16
}

fn month_abbrev(now: DateTime<Utc>) -> String {
    now.format("%b").to_string().to_uppercase()
}

/// `RE-YYYYMM-L<3digits>-T<3digits>-<6 random [A-Z0-9]>`
pub fn payment_reference(landlord_id: &str, tenant_id: &str, now: DateTime<Utc>) -> String {
    let suffix = random_suffix(6);
    format!(
        "RE-{}-L{:03}-T{:03}-{}",
        now.format("%Y%m"),
        digits3(landlord_id),
        digits3(tenant_id),
        suffix
    )
}

fn random_suffix(len: usize) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

/// `T<4>-<MON>` form of the account reference, used when no property/unit
/// context is available.
pub fn account_reference_tenant(tenant_id: &str, now: DateTime<Utc>) -> String {
    let tenant_tag = truncate_to(tenant_id, 4).to_uppercase();
    truncate_to(
        &format!("T{tenant_tag}-{}", month_abbrev(now)),
        ACCOUNT_REFERENCE_MAX,
    )
}

/// `<PROP4>-<UNIT3>-<MON>` form of the account reference.
pub fn account_reference_property_unit(
    property_code: &str,
    unit_code: &str,
    now: DateTime<Utc>,
) -> String {
    let prop = truncate_to(property_code, 4).to_uppercase();
    let unit = truncate_to(unit_code, 3).to_uppercase();
    truncate_to(
        &format!("{prop}-{unit}-{}", month_abbrev(now)),
        ACCOUNT_REFERENCE_MAX,
    )
}

/// `Rent-<MON>` form of the transaction description.
pub fn transaction_desc_simple(now: DateTime<Utc>) -> String {
    truncate_to(&format!("Rent-{}", month_abbrev(now)), TRANSACTION_DESC_MAX)
}

/// `Rent-<PROP5>-<MON>` form of the transaction description.
pub fn transaction_desc_property(property_code: &str, now: DateTime<Utc>) -> String {
    let prop = truncate_to(property_code, 5).to_uppercase();
    truncate_to(
        &format!("Rent-{prop}-{}", month_abbrev(now)),
        TRANSACTION_DESC_MAX,
    )
}

/// `sha256(landlordId-tenantId-billId-nowMs)[:32]` uppercase.
pub fn idempotency_key(landlord_id: &str, tenant_id: &str, bill_id: &str, now_ms: i64) -> String {
    let input = format!("{landlord_id}-{tenant_id}-{bill_id}-{now_ms}");
    let digest = Sha256::digest(input.as_bytes());
    let hex = hex::encode(digest).to_uppercase();
    truncate_to(&hex, IDEMPOTENCY_KEY_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn payment_reference_has_expected_shape() {
        let reference = payment_reference("landlord-1", "tenant-1", fixed_now());
        assert!(reference.starts_with("RE-202603-L"));
        assert!(reference.len() <= 32);
    }

    #[test]
    fn account_reference_truncates_to_13_chars() {
        let reference =
            account_reference_property_unit("PROPERTYLONG", "UNITLONG", fixed_now());
        assert!(reference.len() <= 13);
    }

    #[test]
    fn transaction_desc_truncates_to_20_chars() {
        let desc = transaction_desc_property("PROPERTYVERYLONGNAME", fixed_now());
        assert!(desc.len() <= 20);
    }

    #[test]
    fn idempotency_key_is_deterministic() {
        let a = idempotency_key("L1", "T1", "B1", 1_700_000_000_000);
        let b = idempotency_key("L1", "T1", "B1", 1_700_000_000_000);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn idempotency_key_changes_with_inputs() {
        let a = idempotency_key("L1", "T1", "B1", 1_700_000_000_000);
        let b = idempotency_key("L1", "T1", "B1", 1_700_000_000_001);
        assert_ne!(a, b);
    }

    #[test]
    fn digits3_is_stable_and_bounded() {
        assert_eq!(digits3("same-id"), digits3("same-id"));
        assert!(digits3("any-id") < 1000);
    }
}
