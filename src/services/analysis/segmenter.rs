// Sentence Segmentation Service
// Splits raw documents into clean, comparable sentences

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::models::SegmenterLimits;

/// A sentence that survived cleaning and filtering, ready for screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub text: String,
    pub word_count: usize,
    pub char_length: usize,
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[^\w\s.!?;:,\-'"]"#).unwrap())
}

fn sentence_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+\s+([A-Z])").unwrap())
}

fn trailing_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+$").unwrap())
}

fn blank_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").unwrap())
}

fn clause_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r";\s+([A-Z])").unwrap())
}

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z]+\b").unwrap())
}

fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
            "of", "with", "by", "is", "are", "was", "were", "be", "been", "being",
            "have", "has", "had", "do", "does", "did", "will", "would", "could",
            "should", "may", "might", "can", "this", "that", "these", "those",
            "it", "he", "she", "they", "we", "you", "i", "me", "him", "her",
            "them", "us", "my", "your", "his", "its", "our", "their",
        ]
        .into_iter()
        .collect()
    })
}

/// Collapse whitespace and replace anything outside the kept character set
/// (word chars, whitespace and basic sentence punctuation) with a space.
pub fn clean_text(text: &str) -> String {
    let collapsed = whitespace_re().replace_all(text, " ");
    let cleaned = charset_re().replace_all(&collapsed, " ");
    cleaned.trim().to_string()
}

/// Lower-case word tokens with stop words and tokens of length <= 2 removed.
pub fn meaningful_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_re()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|w| w.len() > 2 && !stop_words().contains(w))
        .map(|w| w.to_string())
        .collect()
}

pub struct SentenceSegmenter {
    limits: SegmenterLimits,
}

impl SentenceSegmenter {
    pub fn new(limits: SegmenterLimits) -> Self {
        Self { limits }
    }

    /// Extract the sentences worth screening, in document order.
    pub fn extract_sentences(&self, text: &str) -> Vec<Sentence> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let cleaned = clean_text(text);
        let fragments = cascade_split(&cleaned);

        let mut sentences = Vec::new();
        for fragment in fragments {
            let words = meaningful_words(&fragment);
            if words.len() < self.limits.min_sentence_words
                || words.len() > self.limits.max_sentence_words
            {
                continue;
            }
            if words.len() < self.limits.min_meaningful_words {
                continue;
            }
            let char_length = fragment.chars().count();
            if char_length < self.limits.min_sentence_chars {
                continue;
            }
            sentences.push(Sentence {
                word_count: fragment.split_whitespace().count(),
                char_length,
                text: fragment,
            });
        }
        sentences
    }
}

/// Split cleaned text into trimmed fragments, applying each boundary rule to
/// every fragment produced by the previous one.
fn cascade_split(cleaned: &str) -> Vec<String> {
    let mut fragments = vec![cleaned.to_string()];

    // Terminal punctuation before a capital starts a new fragment. The regex
    // crate has no lookahead, so mark the boundary and split on the marker,
    // keeping the capital.
    fragments = split_on_marker(&fragments, sentence_boundary_re());

    // A trailing punctuation run is a separator with nothing after it.
    fragments = fragments
        .iter()
        .map(|f| trailing_punct_re().replace(f, "").trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    fragments = fragments
        .iter()
        .flat_map(|f| blank_line_re().split(f))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    fragments = split_on_marker(&fragments, clause_boundary_re());

    fragments
}

fn split_on_marker(fragments: &[String], re: &Regex) -> Vec<String> {
    let mut out = Vec::new();
    for fragment in fragments {
        let marked = re.replace_all(fragment, "\x00$1");
        out.extend(
            marked
                .split('\x00')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        );
    }
    out
}
