use std::io::Read;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use copycheck::models::CandidateMatch;
use copycheck::{
    init_logging, ConfigStore, GoogleSearchClient, PlagiarismChecker, Report, SearchError,
    SearchProvider,
};

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// Answers every query with no candidates, so nothing gets flagged.
struct OfflineSearch;

#[async_trait]
impl SearchProvider for OfflineSearch {
    async fn search(&self, _query: &str) -> Result<Vec<CandidateMatch>, SearchError> {
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin check_text -- <path | -> [--offline] [--threshold <0..1>] [--out <json_path>]\n\nNotes:\n  - `-` reads the document from stdin.\n  - `--offline` skips web search entirely (useful for testing segmentation).\n  - Google credentials come from the config file; run with COPYCHECK_SEARCH_URL to point at a proxy."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let offline = has_flag(&args, "--offline");
    let threshold = parse_arg_value(&args, "--threshold").and_then(|s| s.parse::<f64>().ok());
    let out_path = parse_arg_value(&args, "--out");

    let text = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("read stdin failed")?;
        buffer
    } else {
        std::fs::read_to_string(&path).with_context(|| format!("read file failed: {}", path))?
    };

    let config_dir = ConfigStore::default_config_dir()
        .ok_or_else(|| anyhow!("no config directory available"))?;
    let store = ConfigStore::new(config_dir);
    let mut app_config = store.load().map_err(|e| anyhow!(e))?;
    if let Some(threshold) = threshold {
        app_config.checker.similarity_threshold = threshold;
    }

    println!("Document: {}", if path == "-" { "(stdin)" } else { path.as_str() });
    println!("Length: {} chars", text.chars().count());
    println!("Search: {}", if offline { "offline" } else { "google" });
    println!("Threshold: {}", app_config.checker.similarity_threshold);
    println!();

    let provider: Arc<dyn SearchProvider> = if offline {
        Arc::new(OfflineSearch)
    } else {
        Arc::new(GoogleSearchClient::new(&app_config.search))
    };
    let checker = PlagiarismChecker::new(provider, app_config.checker.clone());

    let mut progress = |index: usize, total: usize, sentence: &str| {
        println!("[{}/{}] {}", index, total, preview(sentence, 80));
    };
    let report = checker.check_text(&text, Some(&mut progress)).await;

    print_summary(&report);

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("write out failed: {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

fn print_summary(report: &Report) {
    let summary = &report.summary;
    println!();
    println!("Risk level: {}", summary.risk_level.as_str());
    println!("Overall score: {}/100", summary.overall_score);
    println!(
        "Sentences: {} total, {} analyzed, {} errors",
        summary.total_sentences, summary.analyzed_sentences, summary.error_count
    );
    println!(
        "Plagiarized: {} ({}%)",
        summary.plagiarized_sentences, summary.plagiarism_percentage
    );
    println!(
        "Similarity: avg {}%, max {}%",
        summary.average_similarity, summary.maximum_similarity
    );
    if let Some(domain) = &report.source_analysis.most_problematic_domain {
        println!("Most matched domain: {}", domain);
    }
    println!("Processing time: {}s", summary.processing_time);
    println!();
    for recommendation in &report.recommendations {
        println!("{}", recommendation);
    }
}
