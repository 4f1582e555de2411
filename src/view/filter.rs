//! Fuzzy subsequence matching used by view filters.

/// True when the characters of `query` all appear in `title`, in order.
///
/// Matching is ASCII case-insensitive. An empty query matches everything.
pub fn fuzzy_matches(title: &str, query: &str) -> bool {
    let mut title_iter = title.chars();

    query.chars().all(|qc| {
        let qc_low = qc.to_ascii_lowercase();
        title_iter.any(|tc| tc.to_ascii_lowercase() == qc_low)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_match_simple() {
        let title = "Hello World";
        assert!(fuzzy_matches(title, "hw"));
        assert!(fuzzy_matches(title, "ello"));
        assert!(!fuzzy_matches(title, "xyz"));
    }

    #[test]
    fn fuzzy_match_requires_order() {
        assert!(fuzzy_matches("Metallica", "MTC"));
        assert!(fuzzy_matches("abc", ""));
        assert!(!fuzzy_matches("abc", "ca"));
        assert!(!fuzzy_matches("", "a"));
    }
}
