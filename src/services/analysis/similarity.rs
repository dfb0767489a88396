// Similarity Scoring Service
// Weighted four-metric comparison of normalized sentence text

use std::collections::{HashMap, HashSet};

use crate::models::SimilarityWeights;
use crate::services::analysis::segmenter::meaningful_words;

/// Lower-case, drop ASCII punctuation, collapse whitespace, trim.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct SimilarityScorer {
    weights: SimilarityWeights,
}

impl SimilarityScorer {
    pub fn new(weights: SimilarityWeights) -> Self {
        Self { weights }
    }

    /// Composite similarity of two texts in [0.0, 1.0].
    pub fn score(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let a_norm = normalize_text(a);
        let b_norm = normalize_text(b);
        if a_norm.is_empty() || b_norm.is_empty() {
            return 0.0;
        }

        let sequence = sequence_similarity(&a_norm, &b_norm);
        let semantic = semantic_similarity(&a_norm, &b_norm);
        let structural = structural_similarity(&a_norm, &b_norm);
        let lexical = lexical_similarity(&a_norm, &b_norm);

        let w = &self.weights;
        let combined = w.sequence * sequence
            + w.semantic * semantic
            + w.structural * structural
            + w.lexical * lexical;
        combined.clamp(0.0, 1.0)
    }
}

/// Matching-block ratio over the character sequences: 2M / (|a| + |b|).
/// Greedy block matching is order-sensitive in tie cases, so operands are
/// put in a canonical order first to keep the metric symmetric.
fn sequence_similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let x: Vec<char> = first.chars().collect();
    let y: Vec<char> = second.chars().collect();
    let total = x.len() + y.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_block_total(&x, &y);
    2.0 * matched as f64 / total as f64
}

/// Total size of the recursively matched blocks: take the longest common
/// block, then match what is left on each side of it.
fn matching_block_total(a: &[char], b: &[char]) -> usize {
    let mut total = 0usize;
    let mut windows = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = windows.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        windows.push((alo, i, blo, j));
        windows.push((i + size, ahi, j + size, bhi));
    }
    total
}

/// Earliest longest common block within the given windows.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0usize);
    // lengths[j - blo] holds the run length ending at (i, j)
    let mut lengths = vec![0usize; bhi - blo];
    for (i, &ca) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut prev_diag = 0usize;
        for (j, &cb) in b.iter().enumerate().take(bhi).skip(blo) {
            let idx = j - blo;
            let current = lengths[idx];
            if ca == cb {
                let run = prev_diag + 1;
                lengths[idx] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                lengths[idx] = 0;
            }
            prev_diag = current;
        }
    }
    best
}

/// Average of Jaccard index and overlap coefficient over meaningful-word
/// sets. Two empty sets compare as identical, exactly one as disjoint.
fn semantic_similarity(a: &str, b: &str) -> f64 {
    let words_a: HashSet<String> = meaningful_words(a).into_iter().collect();
    let words_b: HashSet<String> = meaningful_words(b).into_iter().collect();

    if words_a.is_empty() && words_b.is_empty() {
        return 1.0;
    }
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count() as f64;
    let union = words_a.union(&words_b).count() as f64;
    let jaccard = intersection / union;
    let overlap = intersection / words_a.len().min(words_b.len()) as f64;
    (jaccard + overlap) / 2.0
}

/// Average of relative length similarity over characters and over
/// whitespace tokens.
fn structural_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    if len_a == 0.0 || len_b == 0.0 {
        return 0.0;
    }
    let length_sim = 1.0 - (len_a - len_b).abs() / len_a.max(len_b);

    let words_a = a.split_whitespace().count() as f64;
    let words_b = b.split_whitespace().count() as f64;
    let word_sim = 1.0 - (words_a - words_b).abs() / words_a.max(words_b).max(1.0);

    (length_sim + word_sim) / 2.0
}

/// Cosine similarity of whitespace-token term-frequency vectors.
fn lexical_similarity(a: &str, b: &str) -> f64 {
    let counts_a = token_counts(a);
    let counts_b = token_counts(b);
    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    let dot: f64 = counts_a
        .iter()
        .filter_map(|(token, ca)| counts_b.get(token).map(|cb| (ca * cb) as f64))
        .sum();
    let norm_sq_a: f64 = counts_a.values().map(|c| (c * c) as f64).sum();
    let norm_sq_b: f64 = counts_b.values().map(|c| (c * c) as f64).sum();

    let denominator = (norm_sq_a * norm_sq_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    dot / denominator
}

fn token_counts(text: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in text.split_whitespace() {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> SimilarityScorer {
        SimilarityScorer::new(SimilarityWeights::default())
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Hello,   World!"), "hello world");
        assert_eq!(normalize_text("  mixed CASE text  "), "mixed case text");
        assert_eq!(normalize_text("?!?"), "");
    }

    #[test]
    fn test_identical_text_scores_one() {
        let s = "reinforced concrete bridges require periodic structural inspection";
        assert_eq!(scorer().score(s, s), 1.0);
    }

    #[test]
    fn test_identity_survives_punctuation_and_case() {
        let score = scorer().score("Hello, World!", "hello world");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_numeric_only_identity() {
        // no meaningful words at all, still maximal against itself
        assert_eq!(scorer().score("42 195 807", "42 195 807"), 1.0);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let s = scorer();
        assert_eq!(s.score("", "anything at all"), 0.0);
        assert_eq!(s.score("anything at all", ""), 0.0);
        // empty after normalization
        assert_eq!(s.score("?!?", "anything at all"), 0.0);
    }

    #[test]
    fn test_composite_is_symmetric() {
        let pairs = [
            ("the solar panel array generates power", "a solar array generates some power"),
            ("gamma", "delta"),
            ("completely unrelated words here", "nothing shared whatsoever today"),
            ("alpha beta gamma", "alpha beta delta"),
        ];
        let s = scorer();
        for (a, b) in pairs {
            let forward = s.score(a, b);
            let backward = s.score(b, a);
            assert_eq!(forward, backward, "asymmetric for {:?} / {:?}", a, b);
            assert!((0.0..=1.0).contains(&forward));
        }
    }

    #[test]
    fn test_known_metric_breakdown() {
        // sequence: common block "alpha beta " (11) plus "a" (1) of 32 chars
        // semantic: jaccard 2/4, overlap 2/3
        // structural: equal lengths and token counts
        // lexical: dot 2 over norms sqrt(3) * sqrt(3)
        let score = scorer().score("alpha beta gamma", "alpha beta delta");
        let expected =
            0.3 * 0.75 + 0.3 * ((0.5 + 2.0 / 3.0) / 2.0) + 0.2 * 1.0 + 0.2 * (2.0 / 3.0);
        assert!((score - expected).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_disjoint_texts_score_low() {
        let score = scorer().score(
            "quantum entanglement defies classical intuition",
            "medieval farmers rotated barley crops",
        );
        assert!(score < 0.5, "got {}", score);
        assert!(score.is_finite());
    }

    #[test]
    fn test_one_sided_meaningful_words() {
        // left side normalizes to digits only, right has real words
        let score = scorer().score("1234 5678", "quantum systems evolve");
        assert!((0.0..1.0).contains(&score));
        assert!(score.is_finite());
    }

    #[test]
    fn test_sequence_similarity_partial() {
        let ratio = sequence_similarity("abcd", "bcde");
        // block "bcd" shared, 2 * 3 / 8
        assert!((ratio - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a: Vec<char> = "xxabxx".chars().collect();
        let b: Vec<char> = "ab".chars().collect();
        let (i, j, size) = longest_match(&a, &b, 0, a.len(), 0, b.len());
        assert_eq!((i, j, size), (2, 0, 2));
    }
}
