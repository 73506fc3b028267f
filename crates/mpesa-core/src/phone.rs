//! Kenyan MSISDN normalization (C2, §4.2)

/// Normalize a Kenyan phone number to `254XXXXXXXXX` form.
///
/// Strips spaces, hyphens, parentheses, and a leading `+` before matching
/// one of three accepted shapes. Any other input returns `None`.
pub fn normalize(input: &str) -> Option<String> {
    let stripped: String = input
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let stripped = stripped.strip_prefix('+').unwrap_or(&stripped);

    if !stripped.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let leading_ok = |c: char| c == '1' || c == '7';

    match stripped.len() {
        12 if stripped.starts_with("254") && leading_ok(nth_char(stripped, 3)?) => {
            Some(stripped.to_string())
        }
        10 if stripped.starts_with('0') && leading_ok(nth_char(stripped, 1)?) => {
            Some(format!("254{}", &stripped[1..]))
        }
        9 if leading_ok(nth_char(stripped, 0)?) => Some(format!("254{stripped}")),
        _ => None,
    }
}

fn nth_char(s: &str, n: usize) -> Option<char> {
    s.chars().nth(n)
}

/// Last 3 digits of an already-normalized number.
pub fn last3(normalized: &str) -> Option<&str> {
    if normalized.len() >= 3 {
        Some(&normalized[normalized.len() - 3..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_254_form() {
        assert_eq!(normalize("254712345678"), Some("254712345678".to_string()));
    }

    #[test]
    fn accepts_0_form() {
        assert_eq!(normalize("0712345678"), Some("254712345678".to_string()));
    }

    #[test]
    fn accepts_9_digit_form() {
        assert_eq!(normalize("712345678"), Some("254712345678".to_string()));
    }

    #[test]
    fn accepts_plus_prefix_and_punctuation() {
        assert_eq!(
            normalize("+254 (712) 345-678"),
            Some("254712345678".to_string())
        );
    }

    #[test]
    fn rejects_invalid_leading_digit() {
        assert_eq!(normalize("0212345678"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize("not-a-phone"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["0712345678", "254712345678", "712345678"] {
            let once = normalize(input).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn last3_extracts_final_digits() {
        assert_eq!(last3("254712345678"), Some("678"));
    }
}
