// Sentence Evaluation Service
// Scores a sentence against its search candidates and issues a verdict

use crate::models::{CandidateMatch, ConfidenceLevel, SentenceEvaluation, SimilarityWeights};
use crate::services::analysis::similarity::SimilarityScorer;

pub struct SentenceEvaluator {
    scorer: SimilarityScorer,
    similarity_threshold: f64,
}

impl SentenceEvaluator {
    pub fn new(weights: SimilarityWeights, similarity_threshold: f64) -> Self {
        Self {
            scorer: SimilarityScorer::new(weights),
            similarity_threshold,
        }
    }

    /// Best-match verdict for one sentence. Candidates are scored in order
    /// and only a strictly better similarity replaces the current best, so
    /// ties keep the earliest candidate.
    pub fn evaluate(&self, sentence: &str, candidates: &[CandidateMatch]) -> SentenceEvaluation {
        let mut best_similarity = 0.0;
        let mut best_source: Option<CandidateMatch> = None;

        for candidate in candidates {
            let similarity = self.scorer.score(sentence, &candidate.snippet);
            if similarity > best_similarity {
                best_similarity = similarity;
                best_source = Some(candidate.clone());
            }
        }

        SentenceEvaluation {
            sentence: sentence.to_string(),
            similarity: best_similarity,
            source: best_source,
            is_plagiarism: best_similarity > self.similarity_threshold,
            confidence_level: confidence_level(best_similarity),
            risk_score: risk_score(best_similarity),
            error: None,
        }
    }

    /// Placeholder verdict for a sentence whose search failed. It carries
    /// the failure message and stays out of aggregate statistics.
    pub fn error_evaluation(&self, sentence: &str, message: impl Into<String>) -> SentenceEvaluation {
        SentenceEvaluation {
            sentence: sentence.to_string(),
            similarity: 0.0,
            source: None,
            is_plagiarism: false,
            confidence_level: ConfidenceLevel::VeryLow,
            risk_score: 0,
            error: Some(message.into()),
        }
    }
}

pub fn confidence_level(similarity: f64) -> ConfidenceLevel {
    if similarity >= 0.9 {
        ConfidenceLevel::VeryHigh
    } else if similarity >= 0.8 {
        ConfidenceLevel::High
    } else if similarity >= 0.7 {
        ConfidenceLevel::MediumHigh
    } else if similarity >= 0.6 {
        ConfidenceLevel::Medium
    } else if similarity >= 0.4 {
        ConfidenceLevel::MediumLow
    } else if similarity >= 0.2 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::VeryLow
    }
}

pub fn risk_score(similarity: f64) -> i32 {
    (similarity * 100.0).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator(threshold: f64) -> SentenceEvaluator {
        SentenceEvaluator::new(SimilarityWeights::default(), threshold)
    }

    fn candidate(url: &str, snippet: &str) -> CandidateMatch {
        CandidateMatch {
            title: "Candidate Page".to_string(),
            url: url.to_string(),
            domain: "example.org".to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_no_candidates_yields_default_verdict() {
        let result = evaluator(0.65).evaluate("the committee approved the annual budget", &[]);
        assert_eq!(result.similarity, 0.0);
        assert!(result.source.is_none());
        assert!(!result.is_plagiarism);
        assert_eq!(result.confidence_level, ConfidenceLevel::VeryLow);
        assert_eq!(result.risk_score, 0);
        assert!(result.is_valid());
    }

    #[test]
    fn test_best_candidate_wins() {
        let sentence = "glaciers store most of the planet's fresh water reserves";
        let candidates = vec![
            candidate("https://a.example/1", "tax law changed again this year"),
            candidate(
                "https://b.example/2",
                "glaciers store most of the planet's fresh water reserves",
            ),
            candidate("https://c.example/3", "glaciers are found in mountains"),
        ];
        let result = evaluator(0.65).evaluate(sentence, &candidates);
        assert_eq!(result.similarity, 1.0);
        assert_eq!(result.source.as_ref().map(|s| s.url.as_str()), Some("https://b.example/2"));
        assert!(result.is_plagiarism);
        assert_eq!(result.confidence_level, ConfidenceLevel::VeryHigh);
        assert_eq!(result.risk_score, 100);
    }

    #[test]
    fn test_tie_keeps_earliest_candidate() {
        let sentence = "migratory birds navigate using the magnetic field";
        let duplicate = "migratory birds navigate using the magnetic field";
        let candidates = vec![
            candidate("https://first.example", duplicate),
            candidate("https://second.example", duplicate),
        ];
        let result = evaluator(0.65).evaluate(sentence, &candidates);
        assert_eq!(
            result.source.as_ref().map(|s| s.url.as_str()),
            Some("https://first.example")
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let sentence = "volcanic ash clouds can ground air traffic for days";
        let exact = vec![candidate("https://x.example", sentence)];

        // perfect match never exceeds a threshold of 1.0
        let at_limit = evaluator(1.0).evaluate(sentence, &exact);
        assert_eq!(at_limit.similarity, 1.0);
        assert!(!at_limit.is_plagiarism);

        let below_limit = evaluator(0.9).evaluate(sentence, &exact);
        assert!(below_limit.is_plagiarism);
    }

    #[test]
    fn test_confidence_band_boundaries() {
        assert_eq!(confidence_level(0.95), ConfidenceLevel::VeryHigh);
        assert_eq!(confidence_level(0.9), ConfidenceLevel::VeryHigh);
        assert_eq!(confidence_level(0.8), ConfidenceLevel::High);
        assert_eq!(confidence_level(0.7), ConfidenceLevel::MediumHigh);
        assert_eq!(confidence_level(0.6), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(0.4), ConfidenceLevel::MediumLow);
        assert_eq!(confidence_level(0.2), ConfidenceLevel::Low);
        assert_eq!(confidence_level(0.19), ConfidenceLevel::VeryLow);
        assert_eq!(confidence_level(0.0), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn test_risk_score_rounds_to_nearest() {
        assert_eq!(risk_score(0.0), 0);
        assert_eq!(risk_score(1.0), 100);
        assert_eq!(risk_score(0.674), 67);
        assert_eq!(risk_score(0.675), 68);
    }

    #[test]
    fn test_error_evaluation_shape() {
        let result = evaluator(0.65).error_evaluation(
            "solar flares disrupt radio communication",
            "search failed: timeout",
        );
        assert!(!result.is_valid());
        assert_eq!(result.error.as_deref(), Some("search failed: timeout"));
        assert_eq!(result.similarity, 0.0);
        assert!(!result.is_plagiarism);
        assert!(result.source.is_none());
    }
}
