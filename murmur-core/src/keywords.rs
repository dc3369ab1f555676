//! Keyword extraction over finished transcripts.
//!
//! Pure text analysis with no native resources, so it runs wherever the
//! caller is, after the worker has already replied.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Maximum number of keywords returned.
const MAX_KEYWORDS: usize = 10;

/// Tokens shorter than this carry no signal and are dropped.
const MIN_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "because", "been", "before", "being",
    "below", "between", "both", "could", "does", "doing", "down", "during", "each", "from",
    "further", "have", "having", "here", "hers", "herself", "himself", "into", "itself", "just",
    "like", "more", "most", "once", "only", "other", "ours", "ourselves", "over", "same",
    "should", "some", "such", "than", "that", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "under", "until", "very", "were",
    "what", "when", "where", "which", "while", "will", "with", "would", "your", "yours",
    "yourself",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Extract up to ten ranked keywords from `text`.
///
/// Tokens are lowercased, stripped of punctuation, filtered against the
/// stop-word set and a minimum length, de-duplicated (first occurrence
/// wins), then ranked by descending length. Deterministic for a given
/// input; empty input yields an empty list.
pub fn extract(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords: Vec<String> = Vec::new();

    for raw in text.split_whitespace() {
        let token: String = raw
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        if token.chars().count() < MIN_CHARS {
            continue;
        }
        if stop_words().contains(token.as_str()) {
            continue;
        }
        if seen.insert(token.clone()) {
            keywords.push(token);
        }
    }

    // Stable sort: equal lengths keep first-occurrence order.
    keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_keywords() {
        assert!(extract("").is_empty());
        assert!(extract("   \n\t ").is_empty());
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        let keywords = extract("the cat ran with some impressive speed");
        assert_eq!(keywords, vec!["impressive", "speed"]);
    }

    #[test]
    fn strips_punctuation_and_lowercases() {
        let keywords = extract("Hello, HELLO! Wonderful... world-building?");
        assert_eq!(keywords, vec!["worldbuilding", "wonderful", "hello"]);
    }

    #[test]
    fn deduplicates_preserving_first_occurrence() {
        let keywords = extract("motor Motor MOTOR turbine motor");
        assert_eq!(keywords, vec!["turbine", "motor"]);
    }

    #[test]
    fn ranks_by_descending_length_stably() {
        // "compressor" and "ventilator" tie on length; first occurrence
        // stays first.
        let keywords = extract("gear compressor ventilator turbine");
        assert_eq!(keywords, vec!["compressor", "ventilator", "turbine", "gear"]);
    }

    #[test]
    fn caps_at_ten_keywords() {
        let text = "alpha bravo charlie deltaic echoes foxtrot golfing hotels indiana juliett kilogram limas";
        let keywords = extract(text);
        assert_eq!(keywords.len(), 10);
        // Of the three five-letter tokens only the first survives the cap.
        assert!(keywords.contains(&"alpha".to_string()));
        assert!(!keywords.contains(&"bravo".to_string()));
        assert!(!keywords.contains(&"limas".to_string()));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let text = "reactor coolant pressure dropped during the overnight maintenance window";
        assert_eq!(extract(text), extract(text));
    }
}
