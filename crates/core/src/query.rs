//! Query normalization shared by the cache key and rule evaluation.

/// Case-fold a query and collapse every run of whitespace to a single space.
///
/// Queries that differ only by casing or incidental whitespace normalize to
/// the same string.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a query carries no content at all.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_whitespace() {
        assert_eq!(normalize_query("  What IS\tparvovirus \n"), "what is parvovirus");
        assert_eq!(
            normalize_query("what is parvovirus"),
            normalize_query("What   is PARVOVIRUS")
        );
    }

    #[test]
    fn keeps_non_ascii_text() {
        assert_eq!(normalize_query(" 狗狗 疫苗 "), "狗狗 疫苗");
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n "));
        assert!(!is_blank(" a "));
    }
}
