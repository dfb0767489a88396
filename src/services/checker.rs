// Plagiarism Checker Pipeline
// Drives segmentation, search and evaluation into a final report

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::models::{CheckerConfig, Report};
use crate::services::analysis::aggregation::{self, EmptyReason};
use crate::services::analysis::evaluator::SentenceEvaluator;
use crate::services::analysis::segmenter::SentenceSegmenter;
use crate::services::search::SearchProvider;

/// Progress sink invoked once per sentence, before that sentence's search
/// runs, with the 1-based index, the total and the sentence text.
pub trait ProgressObserver: Send {
    fn on_sentence(&mut self, index: usize, total: usize, sentence: &str);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize, &str) + Send,
{
    fn on_sentence(&mut self, index: usize, total: usize, sentence: &str) {
        self(index, total, sentence)
    }
}

pub struct PlagiarismChecker {
    provider: Arc<dyn SearchProvider>,
    segmenter: SentenceSegmenter,
    evaluator: SentenceEvaluator,
    config: CheckerConfig,
}

impl PlagiarismChecker {
    pub fn new(provider: Arc<dyn SearchProvider>, config: CheckerConfig) -> Self {
        Self {
            segmenter: SentenceSegmenter::new(config.limits),
            evaluator: SentenceEvaluator::new(config.weights, config.similarity_threshold),
            provider,
            config,
        }
    }

    /// Screens the text sentence by sentence and always returns a report.
    /// A failed search marks its sentence with an error and the run
    /// continues with the next one.
    pub async fn check_text(
        &self,
        text: &str,
        mut progress: Option<&mut dyn ProgressObserver>,
    ) -> Report {
        let started = Instant::now();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return aggregation::empty_report(text, EmptyReason::NoContent, elapsed(started));
        }
        if trimmed.chars().count() < self.config.min_text_chars {
            return aggregation::empty_report(text, EmptyReason::TextTooShort, elapsed(started));
        }

        let sentences = self.segmenter.extract_sentences(text);
        if sentences.is_empty() {
            return aggregation::empty_report(text, EmptyReason::NoSentences, elapsed(started));
        }

        let total = sentences.len();
        info!("[CHECKER] screening {} sentences", total);

        let mut evaluations = Vec::with_capacity(total);
        for (index, sentence) in sentences.iter().enumerate() {
            if let Some(observer) = progress.as_deref_mut() {
                observer.on_sentence(index + 1, total, &sentence.text);
            }

            let evaluation = match self.provider.search(&sentence.text).await {
                Ok(candidates) => self.evaluator.evaluate(&sentence.text, &candidates),
                Err(e) => {
                    warn!("[CHECKER] search failed for sentence {}: {}", index + 1, e);
                    self.evaluator.error_evaluation(&sentence.text, e.to_string())
                }
            };
            evaluations.push(evaluation);
        }

        let report = aggregation::build_report(evaluations, text, &self.config, elapsed(started));
        info!(
            "[CHECKER] report ready: {} risk, {}% flagged, {} errors",
            report.summary.risk_level.as_str(),
            report.summary.plagiarism_percentage,
            report.summary.error_count
        );
        report
    }
}

fn elapsed(started: Instant) -> f64 {
    started.elapsed().as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateMatch, ConfidenceLevel, RiskLevel};
    use crate::services::search::SearchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEXT: &str = "The ancient fortress guarded the mountain pass for three centuries. \
        Local merchants paid heavy tolls whenever caravans crossed the border. \
        Harsh winters finally drove the garrison away from the region.";

    fn echo_candidate(query: &str) -> CandidateMatch {
        CandidateMatch {
            title: "Echoed Source".to_string(),
            url: "https://mirror.example/doc".to_string(),
            domain: "mirror.example".to_string(),
            snippet: query.to_string(),
        }
    }

    /// Returns the query itself as the only candidate snippet.
    struct EchoSearch;

    #[async_trait]
    impl SearchProvider for EchoSearch {
        async fn search(&self, query: &str) -> Result<Vec<CandidateMatch>, SearchError> {
            Ok(vec![echo_candidate(query)])
        }
    }

    struct StubSearch {
        candidates: Vec<CandidateMatch>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str) -> Result<Vec<CandidateMatch>, SearchError> {
            Ok(self.candidates.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> Result<Vec<CandidateMatch>, SearchError> {
            Err(SearchError::RateLimited)
        }
    }

    /// Fails every second call, starting with the second.
    struct FlakySearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for FlakySearch {
        async fn search(&self, query: &str) -> Result<Vec<CandidateMatch>, SearchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call % 2 == 1 {
                return Err(SearchError::BadStatus(503));
            }
            Ok(vec![echo_candidate(query)])
        }
    }

    fn checker(provider: impl SearchProvider + 'static) -> PlagiarismChecker {
        PlagiarismChecker::new(Arc::new(provider), CheckerConfig::default())
    }

    #[tokio::test]
    async fn test_short_input_gets_safe_report() {
        let report = checker(EchoSearch).check_text("tiny", None).await;
        assert_eq!(report.summary.total_sentences, 0);
        assert_eq!(report.summary.risk_level, RiskLevel::Safe);
        assert_eq!(report.summary.overall_score, 100);
        assert_eq!(report.recommendations, vec!["ℹ️ Text too short".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_input_reports_no_content() {
        let report = checker(EchoSearch).check_text("   \n\t  ", None).await;
        assert_eq!(
            report.recommendations,
            vec!["ℹ️ No content to analyze".to_string()]
        );
        let report = checker(EchoSearch).check_text("", None).await;
        assert_eq!(
            report.recommendations,
            vec!["ℹ️ No content to analyze".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unusable_sentences_report_reason() {
        // five meaningful words is below the minimum of six
        let report = checker(EchoSearch)
            .check_text("aaa bbb ccc ddd eee.", None)
            .await;
        assert_eq!(report.summary.total_sentences, 0);
        assert_eq!(
            report.recommendations,
            vec!["ℹ️ No valid sentences found".to_string()]
        );
    }

    #[tokio::test]
    async fn test_exact_copy_end_to_end() {
        let report = checker(EchoSearch).check_text(TEXT, None).await;
        let summary = &report.summary;

        assert_eq!(summary.total_sentences, 3);
        assert_eq!(summary.analyzed_sentences, 3);
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.plagiarized_sentences, 3);
        assert_eq!(summary.plagiarism_percentage, 100.0);
        assert_eq!(summary.maximum_similarity, 100.0);
        assert_eq!(summary.risk_level, RiskLevel::Critical);
        assert_eq!(summary.overall_score, 0);

        for result in &report.detailed_results {
            assert_eq!(result.similarity, 1.0);
            assert_eq!(result.risk_score, 100);
            assert!(result.is_plagiarism);
            assert_eq!(result.confidence_level, ConfidenceLevel::VeryHigh);
        }

        let sources = &report.source_analysis;
        assert_eq!(sources.total_unique_sources, 1);
        assert_eq!(sources.most_problematic_domain.as_deref(), Some("mirror.example"));
        assert_eq!(sources.top_sources[0].count, 3);
        assert_eq!(report.confidence_distribution[&ConfidenceLevel::VeryHigh], 3);
        assert!(report.recommendations[0].contains("CRITICAL"));
        assert_eq!(report.metadata.original_text, TEXT);
    }

    #[tokio::test]
    async fn test_no_candidates_reports_original() {
        let stub = StubSearch { candidates: Vec::new() };
        let report = checker(stub)
            .check_text(
                "The quick brown fox jumps over the lazy dog near the river bank today.",
                None,
            )
            .await;

        assert_eq!(report.summary.total_sentences, 1);
        assert_eq!(report.summary.analyzed_sentences, 1);
        assert_eq!(report.summary.plagiarism_percentage, 0.0);
        assert_eq!(report.summary.risk_level, RiskLevel::Safe);
        assert_eq!(report.summary.overall_score, 100);
        assert!(report.detailed_results[0].source.is_none());
    }

    #[tokio::test]
    async fn test_unrelated_candidates_stay_safe() {
        let stub = StubSearch {
            candidates: vec![CandidateMatch {
                title: "Weather Report".to_string(),
                url: "https://weather.example/today".to_string(),
                domain: "weather.example".to_string(),
                snippet: "tomorrow brings scattered showers across the coast".to_string(),
            }],
        };
        let report = checker(stub).check_text(TEXT, None).await;

        assert_eq!(report.summary.plagiarized_sentences, 0);
        assert_eq!(report.summary.risk_level, RiskLevel::Safe);
        assert!(report.detailed_results.iter().all(|r| !r.is_plagiarism));
    }

    #[tokio::test]
    async fn test_search_failures_mark_errors() {
        let report = checker(FailingSearch).check_text(TEXT, None).await;
        let summary = &report.summary;

        assert_eq!(summary.total_sentences, 3);
        assert_eq!(summary.error_count, 3);
        assert_eq!(summary.analyzed_sentences, 0);
        assert_eq!(summary.risk_level, RiskLevel::Safe);
        assert_eq!(summary.overall_score, 100);
        assert_eq!(report.detailed_results.len(), 3);
        for result in &report.detailed_results {
            assert_eq!(result.error.as_deref(), Some("Rate limit exceeded"));
        }
    }

    #[tokio::test]
    async fn test_partial_failures_keep_denominator() {
        let flaky = FlakySearch { calls: AtomicUsize::new(0) };
        let report = checker(flaky).check_text(TEXT, None).await;
        let summary = &report.summary;

        assert_eq!(summary.total_sentences, 3);
        assert_eq!(summary.analyzed_sentences, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.plagiarized_sentences, 2);
        // 2 of 3, the errored sentence stays in the denominator
        assert_eq!(summary.plagiarism_percentage, 66.67);
        assert_eq!(summary.risk_level, RiskLevel::Critical);
        assert_eq!(report.detailed_results.len(), 3);
    }

    #[tokio::test]
    async fn test_progress_reports_every_sentence() {
        let mut seen: Vec<(usize, usize, String)> = Vec::new();
        let mut observer = |index: usize, total: usize, sentence: &str| {
            seen.push((index, total, sentence.to_string()));
        };
        checker(EchoSearch).check_text(TEXT, Some(&mut observer)).await;

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, 1);
        assert_eq!(seen[2].0, 3);
        assert!(seen.iter().all(|(_, total, _)| *total == 3));
        assert_eq!(
            seen[0].2,
            "The ancient fortress guarded the mountain pass for three centuries"
        );
    }

    #[tokio::test]
    async fn test_threshold_is_strict_end_to_end() {
        let config = CheckerConfig {
            similarity_threshold: 1.0,
            ..CheckerConfig::default()
        };
        let checker = PlagiarismChecker::new(Arc::new(EchoSearch), config);
        let report = checker.check_text(TEXT, None).await;

        assert_eq!(report.summary.maximum_similarity, 100.0);
        assert_eq!(report.summary.plagiarized_sentences, 0);
        assert_eq!(report.summary.risk_level, RiskLevel::Safe);
    }
}
