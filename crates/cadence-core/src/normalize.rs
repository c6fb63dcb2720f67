//! Description normalization and category hinting
//!
//! Transactions are grouped into series by a normalized key: the description
//! lower-cased, with every digit removed and whitespace collapsed. Store
//! numbers, dates and reference IDs embedded in bank descriptions fall away,
//! so "NETFLIX.COM 0423" and "Netflix.com  0523" land in the same series.

use crate::models::CategoryHint;

/// Ordered keyword table, evaluated first-match-wins against a normalized key
pub const CATEGORY_HINT_RULES: &[(&str, CategoryHint)] = &[
    ("rent", CategoryHint::Housing),
    ("insurance", CategoryHint::Vehicle),
    ("phone", CategoryHint::Telecom),
    ("mobile", CategoryHint::Telecom),
    ("internet", CategoryHint::Telecom),
    ("wifi", CategoryHint::Telecom),
    ("electric", CategoryHint::Utilities),
    ("gas", CategoryHint::Utilities),
    ("water", CategoryHint::Utilities),
    ("netflix", CategoryHint::Subscription),
    ("spotify", CategoryHint::Subscription),
    ("subscription", CategoryHint::Subscription),
];

/// Compute the grouping key for a description
pub fn normalized_key(description: &str) -> String {
    let lowered: String = description
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .flat_map(char::to_lowercase)
        .collect();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Look up a category hint for an already-normalized key
pub fn category_hint(key: &str) -> CategoryHint {
    category_hint_with_rules(key, CATEGORY_HINT_RULES)
}

/// Look up a category hint against a caller-supplied rule table
pub fn category_hint_with_rules(key: &str, rules: &[(&str, CategoryHint)]) -> CategoryHint {
    rules
        .iter()
        .find(|(needle, _)| key.contains(needle))
        .map(|(_, hint)| *hint)
        .unwrap_or(CategoryHint::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_key_strips_digits_and_case() {
        assert_eq!(normalized_key("NETFLIX.COM 0423"), "netflix.com");
        assert_eq!(normalized_key("Netflix.com  0523"), "netflix.com");
        assert_eq!(normalized_key("  Gym   #12 Membership "), "gym # membership");
        assert_eq!(normalized_key("TFR 2024 01 15 SALARY"), "tfr salary");
    }

    #[test]
    fn test_normalized_key_all_digits_is_empty() {
        assert_eq!(normalized_key("123 456"), "");
        assert_eq!(normalized_key(""), "");
    }

    #[test]
    fn test_category_hint_table() {
        assert_eq!(category_hint("monthly rent payment"), CategoryHint::Housing);
        assert_eq!(category_hint("acme car insurance"), CategoryHint::Vehicle);
        assert_eq!(category_hint("vodafone mobile"), CategoryHint::Telecom);
        assert_eq!(category_hint("fibre internet"), CategoryHint::Telecom);
        assert_eq!(category_hint("city water board"), CategoryHint::Utilities);
        assert_eq!(category_hint("spotify premium"), CategoryHint::Subscription);
        assert_eq!(category_hint("corner bakery"), CategoryHint::Other);
    }

    #[test]
    fn test_category_hint_first_match_wins() {
        // "rent" precedes "insurance" in the table
        assert_eq!(category_hint("renters insurance"), CategoryHint::Housing);
        // "phone" precedes "subscription"
        assert_eq!(category_hint("phone subscription"), CategoryHint::Telecom);
    }

    #[test]
    fn test_category_hint_custom_rules() {
        let rules = [("gym", CategoryHint::Subscription)];
        assert_eq!(
            category_hint_with_rules("city gym", &rules),
            CategoryHint::Subscription
        );
        assert_eq!(category_hint_with_rules("netflix", &rules), CategoryHint::Other);
    }
}
