// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sava classify` command implementation.
//!
//! Builds the store, provider, router and dispatcher from config, gathers
//! input texts from arguments, stdin or a JSON-lines file, and prints one
//! verdict per text.

use std::io::{BufRead, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use sava_config::SavaConfig;
use sava_core::{
    ClassificationRecord, NewsItem, PluginAdapter, ResultStore, SavaError, Sentiment, Verdict,
};
use sava_dispatch::BatchDispatcher;
use sava_gemini::GeminiProvider;
use sava_router::ProviderRouter;
use sava_storage::SqliteResultStore;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    pub one_by_one: bool,
    pub json: bool,
    pub plain: bool,
}

/// One line of `--json` output.
#[derive(Debug, Serialize)]
struct ClassifiedItem<'a> {
    text: &'a str,
    #[serde(flatten)]
    verdict: Verdict,
    fingerprint: &'a str,
    from_cache: bool,
}

/// Run the `sava classify` command.
pub async fn run_classify(
    config: &SavaConfig,
    texts: Vec<String>,
    jsonl: Option<&Path>,
    options: ClassifyOptions,
) -> Result<(), SavaError> {
    let texts = match jsonl {
        Some(path) => read_jsonl(path)?,
        None if texts.is_empty() => read_stdin_lines()?,
        None => texts,
    };

    let store = Arc::new(SqliteResultStore::new(config.storage.clone()));
    store.initialize().await?;
    let provider = Arc::new(GeminiProvider::new(&config.gemini)?);
    let router = Arc::new(ProviderRouter::from_config(provider, config));
    let dispatcher = BatchDispatcher::from_config(store.clone(), router, config);

    let records = if options.one_by_one {
        let mut records = Vec::with_capacity(texts.len());
        for text in &texts {
            records.push(dispatcher.classify_one(text).await?);
        }
        records
    } else {
        dispatcher.classify(&texts).await?
    };

    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "result store shutdown failed");
    }

    if options.json {
        println!("{}", render_json(&texts, &records)?);
    } else {
        let use_color = !options.plain && std::io::stdout().is_terminal();
        for (text, record) in texts.iter().zip(&records) {
            println!("{}", render_line(text, record, use_color));
        }
    }
    Ok(())
}

/// Texts from JSON-lines news items; blank lines are skipped.
fn read_jsonl(path: &Path) -> Result<Vec<String>, SavaError> {
    let reader: Box<dyn BufRead> = if path == Path::new("-") {
        Box::new(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(path).map_err(|e| {
            SavaError::Config(format!("cannot open {}: {e}", path.display()))
        })?;
        Box::new(std::io::BufReader::new(file))
    };
    parse_jsonl(reader)
}

fn parse_jsonl(reader: impl BufRead) -> Result<Vec<String>, SavaError> {
    let mut texts = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SavaError::Internal(format!("failed to read input: {e}")))?;
        if line.trim().is_empty() {
            continue;
        }
        let item: NewsItem = serde_json::from_str(&line)
            .map_err(|e| SavaError::Config(format!("invalid news item on line {}: {e}", n + 1)))?;
        texts.push(item.to_text());
    }
    Ok(texts)
}

fn read_stdin_lines() -> Result<Vec<String>, SavaError> {
    std::io::stdin()
        .lock()
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SavaError::Internal(format!("failed to read stdin: {e}")))
}

fn render_json(texts: &[String], records: &[ClassificationRecord]) -> Result<String, SavaError> {
    let items: Vec<ClassifiedItem<'_>> = texts
        .iter()
        .zip(records)
        .map(|(text, record)| ClassifiedItem {
            text,
            verdict: record.verdict(),
            fingerprint: &record.fingerprint,
            from_cache: record.from_cache,
        })
        .collect();
    serde_json::to_string_pretty(&items)
        .map_err(|e| SavaError::Internal(format!("failed to serialize results: {e}")))
}

fn render_line(text: &str, record: &ClassificationRecord, use_color: bool) -> String {
    let label = format!("{:<8}", record.label.to_string());
    let cached = if record.from_cache { " (cached)" } else { "" };
    if use_color {
        let label = match record.label {
            Sentiment::Positive => label.green().bold(),
            Sentiment::Negative => label.red().bold(),
            Sentiment::Neutral => label.yellow(),
        };
        format!(
            "{label} {text}\n         {}{}",
            record.explanation.dimmed(),
            cached.dimmed()
        )
    } else {
        format!("{label} {text}\n         {}{cached}", record.explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: Sentiment, explanation: &str) -> ClassificationRecord {
        ClassificationRecord::transient("x", Verdict::new(label, explanation))
    }

    #[test]
    fn jsonl_items_become_title_and_body() {
        let input = "{\"title\": \"Sequía en el Valle\", \"body\": \"Pérdidas\"}\n\n{\"title\": \"Solo\"}\n";
        let texts = parse_jsonl(input.as_bytes()).unwrap();
        assert_eq!(texts, vec!["Sequía en el Valle. Pérdidas", "Solo"]);
    }

    #[test]
    fn malformed_jsonl_names_the_line() {
        let err = parse_jsonl("{\"title\": \"ok\"}\nnot json\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn plain_line_shows_label_text_and_explanation() {
        let line = render_line("Heladas", &record(Sentiment::Negative, "helada"), false);
        assert!(line.starts_with("Negative Heladas"));
        assert!(line.contains("helada"));
        assert!(!line.contains("(cached)"));
    }

    #[test]
    fn cached_marker_is_shown() {
        let mut rec = record(Sentiment::Positive, "ok");
        rec.from_cache = true;
        assert!(render_line("t", &rec, false).contains("(cached)"));
    }

    #[test]
    fn json_output_pairs_texts_with_records() {
        let texts = vec!["a".to_string()];
        let records = vec![record(Sentiment::Neutral, "n")];
        let json = render_json(&texts, &records).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["text"], "a");
        assert_eq!(value[0]["label"], "Neutral");
        assert_eq!(value[0]["explanation"], "n");
        assert_eq!(value[0]["from_cache"], false);
    }
}
