// Copycheck Data Models
// Report contract and configuration records shared across services

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============ Search Candidates ============

/// One result returned by the web-search collaborator for a sentence query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub snippet: String,
}

// ============ Sentence Evaluation ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    MediumHigh,
    Medium,
    MediumLow,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "very_high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::MediumHigh => "medium_high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::MediumLow => "medium_low",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very_low",
        }
    }
}

/// Verdict for a single sentence after scoring it against every candidate.
/// `error` is set when the collaborator failed for this sentence; such rows
/// are excluded from aggregate statistics apart from the error count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceEvaluation {
    pub sentence: String,
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CandidateMatch>,
    pub is_plagiarism: bool,
    pub confidence_level: ConfidenceLevel,
    pub risk_score: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SentenceEvaluation {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

// ============ Report Summary ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Safe,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Safe => "SAFE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_sentences: i32,
    pub analyzed_sentences: i32,
    pub error_count: i32,
    pub plagiarized_sentences: i32,
    pub high_risk_sentences: i32,
    pub medium_risk_sentences: i32,
    /// Flagged sentences over all evaluations (errors included), in percent.
    pub plagiarism_percentage: f64,
    pub average_similarity: f64,
    pub maximum_similarity: f64,
    pub risk_level: RiskLevel,
    pub overall_score: i32,
    pub processing_time: f64,
}

// ============ Source Analysis ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSource {
    pub domain: String,
    pub count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContribution {
    pub title: String,
    pub url: String,
    pub similarity: f64,
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceAnalysis {
    pub total_unique_sources: i32,
    #[serde(default)]
    pub top_sources: Vec<TopSource>,
    #[serde(default)]
    pub source_details: HashMap<String, Vec<SourceContribution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_problematic_domain: Option<String>,
}

// ============ Report ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub report_id: String,
    pub original_text: String,
    pub text_length: i32,
    pub word_count: i32,
    /// Characters excluding spaces.
    pub character_count: i32,
    pub timestamp: String,
    pub checker_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: ReportSummary,
    #[serde(default)]
    pub detailed_results: Vec<SentenceEvaluation>,
    pub source_analysis: SourceAnalysis,
    #[serde(default)]
    pub confidence_distribution: HashMap<ConfidenceLevel, i32>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub metadata: ReportMetadata,
}

// ============ Checker Configuration ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityWeights {
    #[serde(default = "default_sequence_weight")]
    pub sequence: f64,
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
    #[serde(default = "default_structural_weight")]
    pub structural: f64,
    #[serde(default = "default_lexical_weight")]
    pub lexical: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            sequence: 0.3,
            semantic: 0.3,
            structural: 0.2,
            lexical: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmenterLimits {
    /// Inclusive bounds on the meaningful-word count of a kept sentence.
    #[serde(default = "default_min_words")]
    pub min_sentence_words: usize,
    #[serde(default = "default_max_words")]
    pub max_sentence_words: usize,
    #[serde(default = "default_min_chars")]
    pub min_sentence_chars: usize,
    #[serde(default = "default_min_meaningful")]
    pub min_meaningful_words: usize,
}

impl Default for SegmenterLimits {
    fn default() -> Self {
        Self {
            min_sentence_words: 6,
            max_sentence_words: 25,
            min_sentence_chars: 20,
            min_meaningful_words: 3,
        }
    }
}

/// Plagiarism-percentage boundaries for the report risk level,
/// evaluated high to low and boundary-inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskThresholds {
    #[serde(default = "default_critical")]
    pub critical: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_low")]
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 40.0,
            high: 25.0,
            medium: 15.0,
            low: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerConfig {
    /// A sentence is flagged when its best similarity is strictly above this.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    /// Inputs shorter than this (after trimming) get a safe report.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default)]
    pub limits: SegmenterLimits,
    #[serde(default)]
    pub weights: SimilarityWeights,
    #[serde(default)]
    pub risk_thresholds: RiskThresholds,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.65,
            min_text_chars: 10,
            limits: SegmenterLimits::default(),
            weights: SimilarityWeights::default(),
            risk_thresholds: RiskThresholds::default(),
        }
    }
}

// ============ Default Value Functions ============

fn default_sequence_weight() -> f64 { 0.3 }
fn default_semantic_weight() -> f64 { 0.3 }
fn default_structural_weight() -> f64 { 0.2 }
fn default_lexical_weight() -> f64 { 0.2 }
fn default_min_words() -> usize { 6 }
fn default_max_words() -> usize { 25 }
fn default_min_chars() -> usize { 20 }
fn default_min_meaningful() -> usize { 3 }
fn default_critical() -> f64 { 40.0 }
fn default_high() -> f64 { 25.0 }
fn default_medium() -> f64 { 15.0 }
fn default_low() -> f64 { 5.0 }
fn default_threshold() -> f64 { 0.65 }
fn default_min_text_chars() -> usize { 10 }
