// Analysis Module
// Sentence-level plagiarism analysis organized into specialized submodules:
// - segmenter: Splits raw documents into clean, filterable sentences
// - similarity: Weighted four-metric similarity scoring
// - evaluator: Per-sentence verdicts against search candidates
// - aggregation: Folds verdicts into the final report

pub mod segmenter;
pub mod similarity;
pub mod evaluator;
pub mod aggregation;

// Re-export commonly used items
pub use segmenter::{clean_text, meaningful_words, Sentence, SentenceSegmenter};
pub use similarity::{normalize_text, SimilarityScorer};
pub use evaluator::SentenceEvaluator;
pub use aggregation::{build_report, empty_report, EmptyReason, CHECKER_VERSION};
