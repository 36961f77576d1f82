// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-reply parsing as an ordered cascade of extraction strategies.
//!
//! Each strategy is a pure function from raw model text to a [`ParseOutcome`].
//! Strategies run in order and the first `Matched` wins; the last one always
//! matches, so every input yields exactly one of the three labels.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use sava_core::{Sentiment, Verdict};

use crate::keywords::polarity_counts;

/// Result of one extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The strategy produced a validated label.
    Matched(Verdict),
    /// The strategy found nothing usable; try the next one.
    Unmatched,
}

/// An extraction strategy.
pub type Strategy = fn(&str) -> ParseOutcome;

/// Strategies in the order they are tried.
pub const CASCADE: &[Strategy] = &[tagged_markers, literal_token, keyword_polarity, fallback];

static LABEL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s*_#>\-]*(?:clasificaci[oó]n|classification|sentimiento|sentiment|label|etiqueta)[\s*_]*:[\s*_]*(.*)$",
    )
    .expect("label marker pattern is valid")
});

static EXPLANATION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\s*_#>\-]*(?:argumento|explicaci[oó]n|explanation|reason|rationale|justificaci[oó]n)[\s*_]*:[\s*_]*(.*)$",
    )
    .expect("explanation marker pattern is valid")
});

static LABEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(positiv[eoa]|negativ[eoa]|neutral|neutr[oa])\b")
        .expect("label token pattern is valid")
});

/// Parse one free-form reply. Never panics; unparseable input is `Neutral`.
pub fn parse_single(raw: &str) -> Verdict {
    CASCADE
        .iter()
        .find_map(|strategy| match strategy(raw) {
            ParseOutcome::Matched(verdict) => Some(verdict),
            ParseOutcome::Unmatched => None,
        })
        .unwrap_or_else(Verdict::undetermined)
}

/// Text of the first explanation marker line at or after `from_line`.
fn explanation_after(raw: &str, from_line: usize) -> Option<String> {
    raw.lines().skip(from_line).find_map(|line| {
        EXPLANATION_MARKER
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().trim_end_matches(['*', '_']).trim().to_string())
            .filter(|text| !text.is_empty())
    })
}

/// `CLASIFICACIÓN: Positivo` / `ARGUMENTO: ...` style replies.
pub fn tagged_markers(raw: &str) -> ParseOutcome {
    for (idx, line) in raw.lines().enumerate() {
        let Some(value) = LABEL_MARKER.captures(line).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let Some(label) = value
            .as_str()
            .split_whitespace()
            .next()
            .and_then(Sentiment::from_label)
        else {
            return ParseOutcome::Unmatched;
        };
        let explanation = explanation_after(raw, idx + 1)
            .or_else(|| explanation_after(raw, 0))
            .unwrap_or_default();
        return ParseOutcome::Matched(Verdict::new(label, &explanation));
    }
    ParseOutcome::Unmatched
}

/// First standalone label word anywhere in the reply.
pub fn literal_token(raw: &str) -> ParseOutcome {
    let Some(label) = LABEL_TOKEN
        .find_iter(raw)
        .find_map(|m| Sentiment::from_label(m.as_str()))
    else {
        return ParseOutcome::Unmatched;
    };
    let explanation = explanation_after(raw, 0).unwrap_or_default();
    ParseOutcome::Matched(Verdict::new(label, &explanation))
}

/// Majority vote between the positive and negative vocabularies.
pub fn keyword_polarity(raw: &str) -> ParseOutcome {
    let (positive, negative) = polarity_counts(raw);
    let label = match positive.cmp(&negative) {
        Ordering::Greater => Sentiment::Positive,
        Ordering::Less => Sentiment::Negative,
        Ordering::Equal => return ParseOutcome::Unmatched,
    };
    let explanation = explanation_after(raw, 0).unwrap_or_default();
    ParseOutcome::Matched(Verdict::new(label, &explanation))
}

/// Terminal step: `Neutral`, "classification undetermined".
pub fn fallback(_raw: &str) -> ParseOutcome {
    ParseOutcome::Matched(Verdict::undetermined())
}
