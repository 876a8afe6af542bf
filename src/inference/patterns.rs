//! Pattern tables for sample-value classification

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII digit classes throughout: a Unicode-aware \d would accept digits
// (e.g. Arabic-Indic) that no downstream numeric or date parser takes.
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[T ][0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:?[0-9]{2})?$",
    )
    .unwrap()
});

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

static DECIMAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

const BOOLEAN_TOKENS: [&str; 8] = ["true", "false", "yes", "no", "1", "0", "t", "f"];

/// ISO calendar date, validated as a real date (rejects 2024-02-30)
pub(crate) fn is_iso_date(value: &str) -> bool {
    DATE_REGEX.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// ISO date-time with optional fractional seconds and optional zone
pub(crate) fn is_iso_datetime(value: &str) -> bool {
    // get() keeps the date-part slice safe on any byte content
    DATETIME_REGEX.is_match(value)
        && value
            .get(..10)
            .is_some_and(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
}

/// Boolean-ish token, case-insensitive
pub(crate) fn is_boolean_token(value: &str) -> bool {
    BOOLEAN_TOKENS.contains(&value.to_lowercase().as_str())
}

/// Integer literal: optional leading minus, digits only
pub(crate) fn is_integer(value: &str) -> bool {
    INTEGER_REGEX.is_match(value)
}

/// Decimal literal: optional sign, optional fractional part, optional exponent
pub(crate) fn is_decimal(value: &str) -> bool {
    DECIMAL_REGEX.is_match(value)
}

/// UUID shape: 8-4-4-4-12 hex groups, case-insensitive
pub(crate) fn is_uuid(value: &str) -> bool {
    UUID_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date() {
        assert!(is_iso_date("2024-01-15"));
        assert!(is_iso_date("2024-12-31"));
        assert!(!is_iso_date("2024-02-30")); // not a real date
        assert!(!is_iso_date("2024-1-15"));
        assert!(!is_iso_date("2024-01-15T10:00:00"));
    }

    #[test]
    fn test_iso_datetime() {
        assert!(is_iso_datetime("2024-01-15T10:30:00"));
        assert!(is_iso_datetime("2024-01-15 10:30:00.123"));
        assert!(is_iso_datetime("2024-01-15T10:30:00Z"));
        assert!(is_iso_datetime("2024-01-15T10:30:00+05:30"));
        assert!(!is_iso_datetime("2024-02-30T10:30:00")); // not a real date
        assert!(!is_iso_datetime("10:30:00"));
    }

    #[test]
    fn test_boolean_tokens() {
        assert!(is_boolean_token("true"));
        assert!(is_boolean_token("FALSE"));
        assert!(is_boolean_token("Yes"));
        assert!(is_boolean_token("t"));
        assert!(is_boolean_token("0"));
        assert!(!is_boolean_token("on"));
    }

    #[test]
    fn test_integer() {
        assert!(is_integer("123"));
        assert!(is_integer("-7"));
        assert!(!is_integer("+7"));
        assert!(!is_integer("1.5"));
        assert!(!is_integer(""));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits are multi-byte and not parseable downstream
        assert!(!is_integer("١٢٣"));
        assert!(!is_decimal("١.٥"));
        assert!(!is_iso_date("٢٠٢٤-٠١-٠١"));
        assert!(!is_iso_datetime("٢٠٢٤-٠١-٠١T٠٠:٠٠:٠٠"));
    }

    #[test]
    fn test_decimal() {
        assert!(is_decimal("123"));
        assert!(is_decimal("-1.5"));
        assert!(is_decimal("+2.75"));
        assert!(is_decimal("6.02e23"));
        assert!(is_decimal("1E-9"));
        assert!(!is_decimal("1,5"));
        assert!(!is_decimal("abc"));
    }

    #[test]
    fn test_uuid_shape() {
        assert!(is_uuid("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_uuid("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!is_uuid("550e8400e29b41d4a716446655440000"));
    }
}
