use std::collections::HashSet;

/// Split raw keyword input into the set of keywords to query.
///
/// Comma-separated, trimmed, lowercased, de-duplicated in first-seen order.
/// Empty segments are dropped, so `"bakery, , Cafe,bakery"` yields
/// `["bakery", "cafe"]`.
pub fn normalize_keywords(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_trim_lowercase() {
        assert_eq!(normalize_keywords("Bakery, CAFE "), vec!["bakery", "cafe"]);
    }

    #[test]
    fn test_deduplicates_in_order() {
        assert_eq!(
            normalize_keywords("cafe,bakery, Cafe ,BAKERY,deli"),
            vec!["cafe", "bakery", "deli"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_keywords("").is_empty());
        assert!(normalize_keywords(" , ,, ").is_empty());
    }
}
