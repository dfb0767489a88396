// Report Aggregation Service
// Folds per-sentence verdicts into the final plagiarism report

use std::collections::HashMap;

use chrono::Local;
use uuid::Uuid;

use crate::models::{
    CheckerConfig, Report, ReportMetadata, ReportSummary, RiskLevel, RiskThresholds,
    SentenceEvaluation, SourceAnalysis, SourceContribution, TopSource,
};

pub const CHECKER_VERSION: &str = "2.0";

const HIGH_RISK_SCORE: i32 = 70;
const MEDIUM_RISK_SCORE: i32 = 50;
const TOP_SOURCE_LIMIT: usize = 5;
const SENTENCE_PREVIEW_CHARS: usize = 100;
const ATTENTION_SIMILARITY: f64 = 0.8;
const MULTI_SOURCE_WARNING_COUNT: i32 = 3;

/// Why a report came back without analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoContent,
    TextTooShort,
    NoSentences,
    NoValidResults,
}

impl EmptyReason {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoContent => "No content to analyze",
            EmptyReason::TextTooShort => "Text too short",
            EmptyReason::NoSentences => "No valid sentences found",
            EmptyReason::NoValidResults => "No valid analysis results",
        }
    }
}

/// Builds the full report from the evaluation list. Errored rows count
/// toward `total_sentences`, the error count and the plagiarism-percentage
/// denominator, and nothing else.
pub fn build_report(
    evaluations: Vec<SentenceEvaluation>,
    original_text: &str,
    config: &CheckerConfig,
    processing_time: f64,
) -> Report {
    let total = evaluations.len();
    let valid: Vec<&SentenceEvaluation> = evaluations.iter().filter(|e| e.is_valid()).collect();
    let error_count = total - valid.len();

    if valid.is_empty() {
        let mut report = empty_report(original_text, EmptyReason::NoValidResults, processing_time);
        report.summary.total_sentences = total as i32;
        report.summary.error_count = error_count as i32;
        report.detailed_results = evaluations;
        return report;
    }

    let flagged: Vec<&SentenceEvaluation> =
        valid.iter().copied().filter(|e| e.is_plagiarism).collect();
    let high_risk = valid.iter().filter(|e| e.risk_score >= HIGH_RISK_SCORE).count();
    let medium_risk = valid
        .iter()
        .filter(|e| e.risk_score >= MEDIUM_RISK_SCORE && e.risk_score < HIGH_RISK_SCORE)
        .count();

    let plagiarism_percentage = flagged.len() as f64 / total as f64 * 100.0;
    let average_similarity =
        valid.iter().map(|e| e.similarity).sum::<f64>() / valid.len() as f64 * 100.0;
    let maximum_similarity = valid.iter().map(|e| e.similarity).fold(0.0, f64::max) * 100.0;

    let risk_level = determine_risk_level(plagiarism_percentage, &config.risk_thresholds);
    let overall_score = overall_score(&valid);

    let source_analysis = analyze_sources(&flagged);
    let mut confidence_distribution = HashMap::new();
    for evaluation in &valid {
        *confidence_distribution.entry(evaluation.confidence_level).or_insert(0) += 1;
    }
    let recommendations = build_recommendations(risk_level, &source_analysis, &valid);

    Report {
        summary: ReportSummary {
            total_sentences: total as i32,
            analyzed_sentences: valid.len() as i32,
            error_count: error_count as i32,
            plagiarized_sentences: flagged.len() as i32,
            high_risk_sentences: high_risk as i32,
            medium_risk_sentences: medium_risk as i32,
            plagiarism_percentage: round2(plagiarism_percentage),
            average_similarity: round2(average_similarity),
            maximum_similarity: round2(maximum_similarity),
            risk_level,
            overall_score,
            processing_time: round2(processing_time),
        },
        detailed_results: evaluations,
        source_analysis,
        confidence_distribution,
        recommendations,
        metadata: build_metadata(original_text),
    }
}

/// Safe report for inputs that produced nothing to analyze. Statistics are
/// zeroed but the metadata still describes the actual input.
pub fn empty_report(original_text: &str, reason: EmptyReason, processing_time: f64) -> Report {
    Report {
        summary: ReportSummary {
            total_sentences: 0,
            analyzed_sentences: 0,
            error_count: 0,
            plagiarized_sentences: 0,
            high_risk_sentences: 0,
            medium_risk_sentences: 0,
            plagiarism_percentage: 0.0,
            average_similarity: 0.0,
            maximum_similarity: 0.0,
            risk_level: RiskLevel::Safe,
            overall_score: 100,
            processing_time: round2(processing_time),
        },
        detailed_results: Vec::new(),
        source_analysis: SourceAnalysis::default(),
        confidence_distribution: HashMap::new(),
        recommendations: vec![format!("ℹ️ {}", reason.message())],
        metadata: build_metadata(original_text),
    }
}

fn determine_risk_level(percentage: f64, thresholds: &RiskThresholds) -> RiskLevel {
    if percentage >= thresholds.critical {
        RiskLevel::Critical
    } else if percentage >= thresholds.high {
        RiskLevel::High
    } else if percentage >= thresholds.medium {
        RiskLevel::Medium
    } else if percentage >= thresholds.low {
        RiskLevel::Low
    } else {
        RiskLevel::Safe
    }
}

fn overall_score(valid: &[&SentenceEvaluation]) -> i32 {
    if valid.is_empty() {
        return 0;
    }
    let total_risk: i32 = valid.iter().map(|e| e.risk_score).sum();
    let average_risk = total_risk as f64 / valid.len() as f64;
    (100 - average_risk.round() as i32).max(0)
}

/// Groups the flagged verdicts by source domain. Top domains are ranked by
/// hit count, ties staying in first-encountered order.
fn analyze_sources(flagged: &[&SentenceEvaluation]) -> SourceAnalysis {
    let mut domain_counts: Vec<(String, i32)> = Vec::new();
    let mut source_details: HashMap<String, Vec<SourceContribution>> = HashMap::new();

    for evaluation in flagged {
        let Some(source) = &evaluation.source else {
            continue;
        };
        let domain = extract_domain(&source.url);
        match domain_counts.iter_mut().find(|(name, _)| *name == domain) {
            Some((_, count)) => *count += 1,
            None => domain_counts.push((domain.clone(), 1)),
        }
        source_details.entry(domain).or_default().push(SourceContribution {
            title: source.title.clone(),
            url: source.url.clone(),
            similarity: evaluation.similarity,
            sentence: sentence_preview(&evaluation.sentence),
        });
    }

    let total_unique_sources = domain_counts.len() as i32;
    let mut top = domain_counts;
    top.sort_by(|a, b| b.1.cmp(&a.1));
    top.truncate(TOP_SOURCE_LIMIT);

    SourceAnalysis {
        total_unique_sources,
        most_problematic_domain: top.first().map(|(domain, _)| domain.clone()),
        top_sources: top
            .into_iter()
            .map(|(domain, count)| TopSource { domain, count })
            .collect(),
        source_details,
    }
}

fn build_recommendations(
    risk_level: RiskLevel,
    sources: &SourceAnalysis,
    valid: &[&SentenceEvaluation],
) -> Vec<String> {
    let base: &[&str] = match risk_level {
        RiskLevel::Critical => &[
            "🚨 CRITICAL: Immediate action required - text contains severe plagiarism",
            "📝 Complete rewrite necessary - current content is not acceptable",
            "🔍 Review all flagged sentences and create original content",
            "📚 Ensure proper citation for all referenced materials",
            "⚖️ Consider legal implications of current plagiarism level",
        ],
        RiskLevel::High => &[
            "⚠️ HIGH RISK: Significant plagiarism detected - major revisions needed",
            "✏️ Rewrite all sentences with similarity > 70%",
            "📖 Add proper citations and references",
            "🔄 Use paraphrasing tools and techniques",
            "👥 Consider peer review before submission",
        ],
        RiskLevel::Medium => &[
            "⚡ MEDIUM RISK: Some plagiarism detected - revisions recommended",
            "📝 Focus on rewriting high-similarity sentences",
            "📑 Add citations where appropriate",
            "🔍 Double-check suspicious content",
            "💡 Enhance with personal insights and analysis",
        ],
        RiskLevel::Low => &[
            "✅ LOW RISK: Minor issues detected - small improvements needed",
            "🔍 Review flagged sentences for improvement",
            "📋 Add citations for referenced facts",
            "💭 Consider adding more original thoughts",
        ],
        RiskLevel::Safe => &["🎉 EXCELLENT: High originality - content appears to be original"],
    };
    let mut recommendations: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    if sources.total_unique_sources > MULTI_SOURCE_WARNING_COUNT {
        recommendations.push(format!(
            "📊 Multiple sources detected ({}) - ensure proper attribution",
            sources.total_unique_sources
        ));
    }

    let attention_count = valid
        .iter()
        .filter(|e| e.similarity > ATTENTION_SIMILARITY)
        .count();
    if attention_count > 0 {
        recommendations.push(format!(
            "🎯 {} sentences need immediate attention (>80% similarity)",
            attention_count
        ));
    }

    recommendations
}

fn build_metadata(original_text: &str) -> ReportMetadata {
    ReportMetadata {
        report_id: Uuid::new_v4().to_string(),
        original_text: original_text.to_string(),
        text_length: original_text.chars().count() as i32,
        word_count: original_text.split_whitespace().count() as i32,
        character_count: original_text.chars().filter(|c| *c != ' ').count() as i32,
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        checker_version: CHECKER_VERSION.to_string(),
    }
}

/// Host part of the URL with a leading `www.` stripped. Strings without a
/// scheme are returned as they are.
fn extract_domain(url: &str) -> String {
    match url.split_once("://") {
        Some((_, rest)) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or("");
            host.strip_prefix("www.").unwrap_or(host).to_string()
        }
        None => url.to_string(),
    }
}

fn sentence_preview(sentence: &str) -> String {
    let preview: String = sentence.chars().take(SENTENCE_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
