//! String similarity measures used for near-duplicate detection.
//!
//! Both measures compare a folded form of their inputs: lower-cased, with every
//! run of non-alphanumeric characters collapsed to a single space and the ends
//! trimmed. So "Intro to CS!!" and "intro to cs" compare as identical.

use std::collections::HashSet;

/// Fold a string into the form both similarity measures operate on
pub fn normalize_for_similarity(value: &str) -> String {
    let mut folded = String::with_capacity(value.len());
    let mut pending_space = false;

    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_space && !folded.is_empty() {
                folded.push(' ');
            }
            pending_space = false;
            folded.push(c);
        } else {
            pending_space = true;
        }
    }

    folded
}

fn tokenize(value: &str) -> HashSet<String> {
    normalize_for_similarity(value)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Jaccard overlap of the token sets; 1.0 when both sides have no tokens
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let left = tokenize(a);
    let right = tokenize(b);

    if left.is_empty() && right.is_empty() {
        return 1.0;
    }

    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

/// Levenshtein distance over chars, two-row dynamic programming
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max_len` on the folded strings; 1.0 when both fold to empty
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let left = normalize_for_similarity(a);
    let right = normalize_for_similarity(b);

    let max_len = left.chars().count().max(right.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - edit_distance(&left, &right) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_punctuation_and_case() {
        assert_eq!(normalize_for_similarity("  Intro to CS!! "), "intro to cs");
        assert_eq!(normalize_for_similarity("AI/ML -- Bootcamp"), "ai ml bootcamp");
        assert_eq!(normalize_for_similarity("!!!"), "");
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        for s in ["", "AI Bootcamp", "Creative Writing Workshop", "?!", "Über Kurs"] {
            assert_eq!(token_similarity(s, s), 1.0, "token similarity for {s:?}");
            assert_eq!(edit_similarity(s, s), 1.0, "edit similarity for {s:?}");
        }
    }

    #[test]
    fn test_measures_are_symmetric() {
        let pairs = [
            ("Intro to Computer Science", "Introduction to Computer Science"),
            ("AI Bootcamp", "Art History"),
            ("", "Robotics"),
            ("Yale University", "Yale Univ."),
        ];
        for (a, b) in pairs {
            assert_eq!(token_similarity(a, b), token_similarity(b, a));
            assert_eq!(edit_similarity(a, b), edit_similarity(b, a));
        }
    }

    #[test]
    fn test_token_similarity_is_jaccard() {
        // {intro, to, cs} vs {intro, to, python}: 2 shared of 4 total
        assert!((token_similarity("Intro to CS", "intro to Python") - 0.5).abs() < 1e-12);
        assert_eq!(token_similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_edit_distance_classic_cases() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_edit_similarity_normalizes_by_longer_string() {
        // "x university" vs "y university": one substitution over 12 chars
        let sim = edit_similarity("X University", "Y University");
        assert!((sim - (1.0 - 1.0 / 12.0)).abs() < 1e-12);
        assert_eq!(edit_similarity("", "abc"), 0.0);
    }
}
