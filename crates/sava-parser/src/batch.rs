// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of combined `index|label|explanation` replies.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sava_core::{Sentiment, Verdict};
use tracing::{debug, warn};

use crate::cascade::parse_single;

/// Accepts `3`, `item 3`, `noticia 3`, `#3`, `3.` and `3)` in any casing.
static INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:item|noticia|news)?\s*#?\s*(\d+)\s*[.):]?$")
        .expect("index pattern is valid")
});

/// Leading list decoration a model may put before the index.
fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '*' | '•' | '>'))
}

/// 1-based item index from the first field of a batch line.
fn parse_index(field: &str) -> Option<usize> {
    let cleaned = field.replace('*', "");
    INDEX
        .captures(cleaned.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse one line into `(index, verdict)`, or `None` if it is not a batch line.
fn parse_line(line: &str) -> Option<(usize, Verdict)> {
    let mut fields = strip_bullet(line).splitn(3, '|');
    let index = parse_index(fields.next()?)?;
    let label_field = fields.next()?;
    let explanation = fields.next().unwrap_or("");
    let explanation = explanation.trim().trim_matches(['*', '_']).trim();

    let verdict = match Sentiment::from_label(&label_field.replace('*', "")) {
        Some(label) => Verdict::new(label, explanation),
        None => parse_single(&format!("{label_field} {explanation}")),
    };
    Some((index, verdict))
}

/// Parse a combined reply into exactly `expected_count` verdicts, in item order.
///
/// The first line seen for an index wins; indices outside `1..=expected_count`
/// are ignored; items the reply never mentions come back `Neutral` with
/// "classification undetermined".
pub fn parse_batch(raw: &str, expected_count: usize) -> Vec<Verdict> {
    let mut by_index: BTreeMap<usize, Verdict> = BTreeMap::new();

    for (index, verdict) in raw.lines().filter_map(parse_line) {
        if index == 0 || index > expected_count {
            debug!(index, expected_count, "ignoring out-of-range batch line");
            continue;
        }
        by_index.entry(index).or_insert(verdict);
    }

    let missing = expected_count - by_index.len();
    if missing > 0 {
        warn!(expected_count, missing, "batch reply did not cover every item");
    } else {
        debug!(expected_count, "batch reply parsed");
    }

    (1..=expected_count)
        .map(|i| by_index.remove(&i).unwrap_or_else(Verdict::undetermined))
        .collect()
}
