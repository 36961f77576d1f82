// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, parser, router, and dispatcher.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum length, in characters, of a stored explanation.
pub const MAX_EXPLANATION_CHARS: usize = 200;

/// Maximum length, in characters, of the stored headline preview.
pub const MAX_HEADLINE_CHARS: usize = 200;

/// Explanation used when a label was found but the model gave no reason.
pub const DEFAULT_EXPLANATION: &str = "no explanation provided";

/// Explanation used when no label could be extracted at all.
pub const UNDETERMINED_EXPLANATION: &str = "classification undetermined";

/// Explanation used when every provider endpoint failed.
pub const SATURATED_EXPLANATION: &str = "system saturated";

/// Three-way sentiment label. Never anything else.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All labels, in display order.
    pub const ALL: [Sentiment; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    /// Normalize a free-form label string and validate it against the three values.
    ///
    /// Accepts English and Spanish forms in any casing, with or without accents,
    /// surrounded by quotes, punctuation or markdown emphasis. Anything else is `None`.
    pub fn from_label(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .chars()
            .map(fold_accent)
            .collect::<String>()
            .to_lowercase();

        match cleaned.as_str() {
            "positive" | "positivo" | "positiva" => Some(Self::Positive),
            "negative" | "negativo" | "negativa" => Some(Self::Negative),
            "neutral" | "neutro" | "neutra" => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// Strip the Spanish acute accents so `"NEGATÍVO"` and `"negativo"` compare equal.
pub fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' => 'a',
        'Á' | 'À' | 'Ä' => 'A',
        'é' | 'è' | 'ë' => 'e',
        'É' | 'È' | 'Ë' => 'E',
        'í' | 'ì' | 'ï' => 'i',
        'Í' | 'Ì' | 'Ï' => 'I',
        'ó' | 'ò' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ö' => 'O',
        'ú' | 'ù' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Ü' => 'U',
        other => other,
    }
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// A validated label plus its justification, as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Sentiment,
    pub explanation: String,
}

impl Verdict {
    /// Build a verdict, trimming and capping the explanation.
    ///
    /// An empty explanation is replaced with [`DEFAULT_EXPLANATION`].
    pub fn new(label: Sentiment, explanation: &str) -> Self {
        let trimmed = explanation.trim();
        let explanation = if trimmed.is_empty() {
            DEFAULT_EXPLANATION.to_string()
        } else {
            truncate_chars(trimmed, MAX_EXPLANATION_CHARS)
        };
        Self { label, explanation }
    }

    /// The explicit fallback when nothing could be extracted.
    pub fn undetermined() -> Self {
        Self::new(Sentiment::Neutral, UNDETERMINED_EXPLANATION)
    }

    /// The degraded verdict used when no endpoint answered.
    pub fn saturated() -> Self {
        Self::new(Sentiment::Neutral, SATURATED_EXPLANATION)
    }
}

/// A cached classification, keyed by content fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub fingerprint: String,
    pub label: Sentiment,
    pub explanation: String,
    /// First characters of the original text, for operators browsing the cache.
    pub headline: String,
    pub created_at: DateTime<Utc>,
    pub hit_count: u32,
    /// Set when this record was served from the store rather than the provider.
    #[serde(default)]
    pub from_cache: bool,
}

impl ClassificationRecord {
    /// Record for a verdict that was not persisted (e.g. a saturated fallback).
    pub fn transient(text: &str, verdict: Verdict) -> Self {
        Self {
            fingerprint: crate::fingerprint::fingerprint(text),
            label: verdict.label,
            explanation: verdict.explanation,
            headline: truncate_chars(text.trim(), MAX_HEADLINE_CHARS),
            created_at: Utc::now(),
            hit_count: 1,
            from_cache: false,
        }
    }

    /// The label/explanation pair without storage metadata.
    pub fn verdict(&self) -> Verdict {
        Verdict {
            label: self.label,
            explanation: self.explanation.clone(),
        }
    }
}

/// Aggregate counters over the result store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_hits: u64,
    pub distribution: BTreeMap<Sentiment, u64>,
    /// Share of lookups answered by an existing row, in `0.0..=1.0`.
    pub hit_rate: f64,
}

impl CacheStats {
    /// Builds stats and derives the hit rate from the two counters.
    pub fn new(total_entries: u64, total_hits: u64, distribution: BTreeMap<Sentiment, u64>) -> Self {
        let hit_rate = if total_hits == 0 {
            0.0
        } else {
            total_hits.saturating_sub(total_entries) as f64 / total_hits as f64
        };
        Self {
            total_entries,
            total_hits,
            distribution,
            hit_rate,
        }
    }
}

/// A news item as delivered by the search/upload collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub title: String,
    pub body: String,
    pub date: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
}

impl NewsItem {
    /// The text submitted for classification: `"{title}. {body}"`.
    pub fn to_text(&self) -> String {
        let title = self.title.trim();
        let body = self.body.trim();
        match (title.is_empty(), body.is_empty()) {
            (false, false) => format!("{title}. {body}"),
            (false, true) => title.to_string(),
            (true, _) => body.to_string(),
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// A single prompt sent to one provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Endpoint (model) identifier, e.g. `"gemini-2.0-flash"`.
    pub model: String,
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// The raw text returned by a provider endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub model: String,
}
