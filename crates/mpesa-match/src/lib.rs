//! Tenant match engine (C7, §4.7)
//!
//! Pure scoring and candidate-selection logic. Callers (the statement
//! ingest coordinator) are responsible for wrapping the result into a
//! persisted `TransactionMatch` with its own id.

use mpesa_types::{Confidence, MatchCandidate, MatchOutcome, MatchType, ParsedTransaction, Tenant};

pub struct MatchResult {
    pub best: Option<MatchCandidate>,
    pub alternatives: Vec<MatchCandidate>,
    pub outcome: MatchOutcome,
}

/// Score `tx` against every tenant in the snapshot and select a best match
/// plus ranked alternatives.
pub fn match_transaction(tx: &ParsedTransaction, tenants: &[Tenant]) -> MatchResult {
    let mut candidates: Vec<MatchCandidate> = tenants.iter().map(|t| score(tx, t)).collect();
    candidates.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    select(candidates)
}

fn score(tx: &ParsedTransaction, tenant: &Tenant) -> MatchCandidate {
    let phone_score = phone_score(tenant.phone_last3(), &tx.sender_phone_last3);
    let name_score = name_score(&tx.sender_name, &tenant.full_name);
    let amount_score = amount_score(tx.amount, tenant.rent_amount as f64);
    let overall_score = 0.60 * name_score + 0.25 * phone_score + 0.15 * amount_score;

    MatchCandidate {
        tenant_id: tenant.id,
        tenant_name: tenant.full_name.clone(),
        phone_score,
        name_score,
        amount_score,
        overall_score,
        confidence: confidence(overall_score),
        match_type: match_type(phone_score, name_score, amount_score),
    }
}

fn phone_score(tenant_last3: Option<&str>, tx_last3: &str) -> f64 {
    match tenant_last3 {
        Some(last3) if last3 == tx_last3 => 100.0,
        _ => 0.0,
    }
}

fn name_score(tx_name: &str, tenant_name: &str) -> f64 {
    let a = tx_name.trim().to_lowercase();
    let b = tenant_name.trim().to_lowercase();
    if a == b {
        return 100.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    let distance = strsim::levenshtein(&a, &b);
    let raw = 100.0 * (max_len as f64 - distance as f64) / max_len as f64;
    raw.clamp(0.0, 100.0)
}

fn amount_score(tx_amount: f64, rent_amount: f64) -> f64 {
    let delta = tx_amount - rent_amount;
    if delta == 0.0 {
        return 100.0;
    }
    let delta_pct = if rent_amount == 0.0 {
        f64::INFINITY
    } else {
        (delta.abs() / rent_amount) * 100.0
    };

    if delta > 0.0 && (5.0..=25.0).contains(&delta_pct) {
        return (100.0 - delta_pct).max(75.0);
    }
    if delta_pct <= 5.0 {
        return 95.0;
    }
    if delta_pct <= 20.0 {
        return 80.0 - delta_pct;
    }
    (50.0 - delta_pct).max(0.0)
}

fn confidence(overall_score: f64) -> Confidence {
    if overall_score >= 90.0 {
        Confidence::High
    } else if overall_score >= 75.0 {
        Confidence::Medium
    } else if overall_score >= 60.0 {
        Confidence::Low
    } else {
        Confidence::None
    }
}

fn match_type(phone_score: f64, name_score: f64, amount_score: f64) -> MatchType {
    let phone_exact = phone_score == 100.0;
    if name_score >= 95.0 && (phone_exact || amount_score >= 95.0) {
        MatchType::Perfect
    } else if name_score >= 90.0 {
        MatchType::Good
    } else if phone_exact && name_score >= 80.0 && amount_score >= 75.0 {
        MatchType::Good
    } else if phone_exact && name_score >= 60.0 {
        MatchType::Partial
    } else if phone_exact || name_score >= 70.0 {
        MatchType::Weak
    } else {
        MatchType::None
    }
}

fn select(candidates: Vec<MatchCandidate>) -> MatchResult {
    let high_name_best = candidates.iter().find(|c| c.name_score >= 95.0).cloned();

    let (best, rest, alt_also_high_name): (MatchCandidate, Vec<MatchCandidate>, bool) =
        if let Some(best) = high_name_best {
            let rest = candidates
                .into_iter()
                .filter(|c| c.tenant_id != best.tenant_id)
                .collect();
            (best, rest, true)
        } else {
            let mut filtered: Vec<MatchCandidate> = candidates
                .into_iter()
                .filter(|c| c.phone_score == 100.0 || c.name_score >= 90.0)
                .collect();
            if filtered.is_empty() {
                return MatchResult {
                    best: None,
                    alternatives: Vec::new(),
                    outcome: MatchOutcome::NoMatch,
                };
            }
            let best = filtered.remove(0);
            (best, filtered, false)
        };

    let alternatives: Vec<MatchCandidate> = rest
        .into_iter()
        .filter(|c| c.overall_score >= 50.0 || (alt_also_high_name && c.name_score >= 80.0))
        .collect();

    let outcome = if best.overall_score < 60.0 {
        MatchOutcome::NoMatch
    } else if alternatives
        .first()
        .map(|a| a.overall_score >= 75.0)
        .unwrap_or(false)
    {
        MatchOutcome::Ambiguous
    } else {
        MatchOutcome::Matched
    };

    MatchResult {
        best: Some(best),
        alternatives,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpesa_types::{PropertyId, TenantId};

    fn tenant(name: &str, phone_last3: &str, rent: u64) -> Tenant {
        Tenant {
            id: TenantId::new(),
            full_name: name.to_string(),
            phone: format!("25470000{phone_last3}"),
            rent_amount: rent,
            property_id: None::<PropertyId>,
            unit_label: None,
            email: None,
        }
    }

    fn tx(name: &str, phone_last3: &str, amount: f64) -> ParsedTransaction {
        ParsedTransaction {
            receipt_no: "QJI1".to_string(),
            completion_time: chrono::NaiveDate::from_ymd_opt(2026, 7, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            details: "x".to_string(),
            sender_phone: format!("0***{phone_last3}"),
            sender_phone_last3: phone_last3.to_string(),
            sender_name: name.to_string(),
            amount,
            balance: 0.0,
        }
    }

    #[test]
    fn exact_name_and_phone_and_amount_is_a_perfect_match() {
        let t = tenant("John Kamau", "393", 5000);
        let transaction = tx("John Kamau", "393", 5000.0);
        let result = match_transaction(&transaction, &[t]);
        let best = result.best.unwrap();
        assert_eq!(best.match_type, MatchType::Perfect);
        assert_eq!(result.outcome, MatchOutcome::Matched);
    }

    #[test]
    fn high_name_score_wins_even_without_phone_confirmation() {
        let decoy = tenant("Someone Else", "393", 5000);
        let real = tenant("Jane Wanjiru Mwangi", "999", 5000);
        let transaction = tx("Jane Wanjiru Mwangi", "393", 5000.0);
        let result = match_transaction(&transaction, &[decoy, real]);
        let best = result.best.unwrap();
        assert_eq!(best.tenant_name, "Jane Wanjiru Mwangi");
    }

    #[test]
    fn no_candidates_meeting_threshold_yields_no_match() {
        let t = tenant("Completely Different Person", "111", 5000);
        let transaction = tx("Totally Unrelated Name", "393", 5000.0);
        let result = match_transaction(&transaction, &[t]);
        assert_eq!(result.outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn overpayment_within_utility_band_scores_at_least_75() {
        // rent 5000, paid 5600 -> delta% = 12%, in (5,25] with delta>0
        let t = tenant("John Kamau", "393", 5000);
        let transaction = tx("John Kamau", "393", 5600.0);
        let result = match_transaction(&transaction, &[t]);
        let best = result.best.unwrap();
        assert!(best.amount_score >= 75.0);
    }

    #[test]
    fn two_close_candidates_are_reported_ambiguous() {
        let a = tenant("John Kamau", "393", 5000);
        let b = tenant("John Kamahu", "393", 5000);
        let transaction = tx("John Kamau", "393", 5000.0);
        let result = match_transaction(&transaction, &[a, b]);
        assert_eq!(result.outcome, MatchOutcome::Ambiguous);
        assert!(!result.alternatives.is_empty());
    }
}
