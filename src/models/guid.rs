//! Subscription id format validation.

use regex::Regex;
use std::sync::OnceLock;

/// GUID text form: optional braces or parentheses, optional hyphens,
/// version nibble 1-5 and variant nibble 8/9/a/b.
static GUID_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_guid_regex() -> &'static Regex {
    GUID_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^[{(]?[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[1-5][0-9a-fA-F]{3}",
            r"-?[89abAB][0-9a-fA-F]{3}-?[0-9a-fA-F]{12}[})]?$"
        ))
        .expect("Invalid Regex")
    })
}

/// Check whether a subscription id returned by the directory is GUID shaped.
pub fn is_valid_guid(subscription_id: &str) -> bool {
    get_guid_regex().is_match(subscription_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_guid() {
        assert!(is_valid_guid("123e4567-e89b-12d3-a456-426614174000"));
    }

    #[test]
    fn test_not_a_guid() {
        assert!(!is_valid_guid("not-a-guid"));
        assert!(!is_valid_guid("abc123"));
        assert!(!is_valid_guid(""));
    }

    #[test]
    fn test_braced_and_parenthesised() {
        assert!(is_valid_guid("{123e4567-e89b-12d3-a456-426614174000}"));
        assert!(is_valid_guid("(123e4567-e89b-12d3-a456-426614174000)"));
    }

    #[test]
    fn test_hyphens_optional() {
        assert!(is_valid_guid("123e4567e89b12d3a456426614174000"));
    }

    #[test]
    fn test_uppercase() {
        assert!(is_valid_guid("123E4567-E89B-12D3-A456-426614174000"));
    }

    #[test]
    fn test_version_nibble_zero_rejected() {
        assert!(!is_valid_guid("123e4567-e89b-02d3-a456-426614174000"));
        assert!(!is_valid_guid("123e4567-e89b-62d3-a456-426614174000"));
    }

    #[test]
    fn test_variant_nibble() {
        assert!(is_valid_guid("123e4567-e89b-12d3-b456-426614174000"));
        assert!(!is_valid_guid("123e4567-e89b-12d3-c456-426614174000"));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(!is_valid_guid("123e4567-e89b-12d3-a456-4266141740001"));
        assert!(!is_valid_guid(" 123e4567-e89b-12d3-a456-426614174000"));
    }
}
