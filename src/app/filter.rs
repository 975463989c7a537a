//! Fuzzy subsequence matching for the `/` filter.

/// Character positions in `label` that match `query` as a case-insensitive
/// subsequence, or `None` if it does not match. An empty query matches
/// everything with no highlighted positions.
pub fn fuzzy_match_positions(label: &str, query: &str) -> Option<Vec<usize>> {
    if query.is_empty() {
        return Some(Vec::new());
    }

    let mut positions: Vec<usize> = Vec::new();
    let mut label_iter = label.chars().enumerate();

    for qc in query.chars() {
        let qc_low = qc.to_lowercase().next().unwrap_or(qc);
        loop {
            match label_iter.next() {
                Some((li, lc)) if lc.to_lowercase().next().unwrap_or(lc) == qc_low => {
                    positions.push(li);
                    break;
                }
                Some(_) => continue,
                None => return None,
            }
        }
    }

    Some(positions)
}

pub fn matches(label: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || fuzzy_match_positions(label, query).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_match_simple() {
        let title = "Hello World";
        assert_eq!(fuzzy_match_positions(title, "hw"), Some(vec![0, 6]));
        assert!(fuzzy_match_positions(title, "ello").is_some());
        assert!(fuzzy_match_positions(title, "xyz").is_none());
    }

    #[test]
    fn fuzzy_is_subsequence_not_substring() {
        assert!(matches("Metallica - Blackened", "mtbk"));
        assert!(!matches("Black Sabbath - Paranoid", "mtbk"));
    }

    #[test]
    fn blank_query_matches_everything() {
        assert!(matches("anything", "   "));
        assert!(matches("Black Sabbath", "Black "));
    }

    #[test]
    fn matching_ignores_case_beyond_ascii() {
        assert!(matches("Ärzte - Schrei nach Liebe", "äs"));
    }
}
