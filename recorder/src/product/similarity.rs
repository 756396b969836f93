//! Fuzzy string similarity.
//!
//! Ratcliff/Obershelp ratio: twice the number of matching characters divided
//! by the total length, where matches are found by taking the longest common
//! block and recursing on both sides of it.

/// Similarity in `[0, 1]`; two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Leftmost longest common substring as `(start_a, start_b, len)`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let len = row[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut row);
    }
    best
}

/// Candidates scoring at least `cutoff`, best first, at most `limit`.
/// Ties keep the candidates' original order.
pub fn close_matches<'a>(query: &str, candidates: &'a [String], limit: usize, cutoff: f64) -> Vec<&'a String> {
    let mut scored: Vec<(f64, &String)> = candidates
        .iter()
        .map(|candidate| (similarity_ratio(query, &candidate.to_lowercase()), candidate))
        .filter(|(score, _)| *score >= cutoff)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, candidate)| candidate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("cola", "cola"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_counts_blocks_on_both_sides() {
        // "abcd" vs "bcda": longest block "bcd", nothing left on either side
        assert_eq!(similarity_ratio("abcd", "bcda"), 0.75);
        // "widget" vs "widgets": 6 matches out of 13 characters
        assert!((similarity_ratio("widget", "widgets") - 12.0 / 13.0).abs() < 1e-9);
        // "water_bottle" vs "waterbottle": two blocks around the underscore
        assert!((similarity_ratio("water_bottle", "waterbottle") - 22.0 / 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_matches_orders_by_score_and_applies_cutoff() {
        let candidates = vec![
            "orange_juice".to_string(),
            "cola".to_string(),
            "colas".to_string(),
            "coca_cola".to_string(),
        ];
        let matches = close_matches("cola", &candidates, 5, 0.6);
        assert_eq!(matches, vec!["cola", "colas", "coca_cola"]);

        let limited = close_matches("cola", &candidates, 1, 0.6);
        assert_eq!(limited, vec!["cola"]);
    }
}
