//! Fuzzy text matching for read-back answers
//!
//! Both strings are lowercased and trimmed, then compared by Levenshtein
//! distance over characters (insert, delete and substitute all cost 1).

/// Minimum similarity for a read-back to count as correct
pub const MATCH_THRESHOLD: f64 = 0.8;

fn normalize(text: &str) -> Vec<char> {
    text.trim().to_lowercase().chars().collect()
}

/// Classic dynamic-programming edit distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    // Single rolling row of the DP table
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal
            } else {
                (diagonal + 1).min(above + 1).min(row[j] + 1)
            };
            diagonal = above;
        }
    }

    row[b.len()]
}

/// Similarity in `[0, 1]` of two answers after normalization
pub fn similarity(answer: &str, expected: &str) -> f64 {
    let a = normalize(answer);
    let b = normalize(expected);
    let (longer, shorter) = if a.len() > b.len() { (a, b) } else { (b, a) };

    if longer.is_empty() {
        return 1.0;
    }

    let distance = levenshtein_chars(&longer, &shorter);
    (longer.len() - distance) as f64 / longer.len() as f64
}

/// Whether `answer` is close enough to `expected`
pub fn is_match(answer: &str, expected: &str) -> bool {
    similarity(answer, expected) >= MATCH_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("céu", "ceu"), 1);
    }

    #[test]
    fn test_identical_after_normalization() {
        assert_eq!(similarity("  The Sun Rises ", "the sun rises"), 1.0);
        assert!(is_match("The sun rises", "the sun rises"));
        assert_eq!(similarity("", "   "), 1.0);
    }

    #[test]
    fn test_single_edit_in_twenty_chars_passes() {
        let expected = "abcdefghijklmnopqrst";
        let answer = "abcdefghijXlmnopqrst";
        let s = similarity(answer, expected);
        assert!((s - 0.95).abs() < 1e-9);
        assert!(is_match(answer, expected));
    }

    #[test]
    fn test_edits_over_twenty_percent_fail() {
        let expected = "abcdefghijklmnopqrst";
        let answer = "XXXXXfghijklmnopqrst";
        assert!((similarity(answer, expected) - 0.75).abs() < 1e-9);
        assert!(!is_match(answer, expected));
        assert!(!is_match("", expected));
    }
}
