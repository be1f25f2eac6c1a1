// ==========================================
// CAERS Core - Field Format Checks
// ==========================================
// Phone, postal code, e-mail and identifier helpers
// shared by the federal rule sets
// ==========================================

use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Exactly ten ASCII digits
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// 5 digits, or 5 digits, a dash and 4 digits
pub fn is_valid_postal_code(postal_code: &str) -> bool {
    let bytes = postal_code.as_bytes();
    let digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
    match bytes.len() {
        5 => digits(bytes),
        10 => digits(&bytes[..5]) && bytes[5] == b'-' && digits(&bytes[6..]),
        _ => false,
    }
}

/// local@domain.tld where the tld is at least two letters
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));
    if !local_ok {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Identifier comparison key: trimmed, lower-cased
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Normalized identifiers that occur more than once, with their first spelling
pub fn duplicate_identifiers<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut counts: BTreeMap<String, (&'a str, usize)> = BTreeMap::new();
    for identifier in identifiers {
        counts
            .entry(normalize_identifier(identifier))
            .and_modify(|(_, n)| *n += 1)
            .or_insert((identifier, 1));
    }
    counts
        .into_values()
        .filter(|(_, n)| *n > 1)
        .map(|(first, _)| first)
        .collect()
}

/// Whether `identifier` collides with any other entry in `all`
pub fn is_duplicate_identifier<'a>(identifier: &str, all: impl IntoIterator<Item = &'a str>) -> bool {
    let key = normalize_identifier(identifier);
    all.into_iter().filter(|other| normalize_identifier(other) == key).count() > 1
}

pub fn in_range(value: Decimal, min: Decimal, max: Decimal) -> bool {
    value >= min && value <= max
}

pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("9195551234"));
        assert!(!is_valid_phone("919-555-1234"));
        assert!(!is_valid_phone("919555123"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_postal_code_format() {
        assert!(is_valid_postal_code("27711"));
        assert!(is_valid_postal_code("27711-0001"));
        assert!(!is_valid_postal_code("2771"));
        assert!(!is_valid_postal_code("27711 0001"));
        assert!(!is_valid_postal_code("27711-01"));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("jane.doe+air@state.nc.us"));
        assert!(is_valid_email("a_b%c@x-y.org"));
        assert!(!is_valid_email("jane.doe"));
        assert!(!is_valid_email("@state.gov"));
        assert!(!is_valid_email("jane@state"));
        assert!(!is_valid_email("jane@state.g"));
        assert!(!is_valid_email("jane@.gov"));
        assert!(!is_valid_email("jane@state.g0v"));
        assert!(!is_valid_email("ja ne@state.gov"));
        assert!(!is_valid_email("jane@st@te.gov"));
    }

    #[test]
    fn test_duplicates_ignore_case_and_whitespace() {
        let ids = ["RP1", " rp1", "RP2"];
        assert_eq!(duplicate_identifiers(ids), vec!["RP1"]);
        assert!(is_duplicate_identifier("rp1 ", ids));
        assert!(!is_duplicate_identifier("RP2", ids));
    }
}
