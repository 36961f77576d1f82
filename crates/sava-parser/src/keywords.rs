// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed polarity vocabulary for the keyword step of the cascade.
//!
//! Entries are accent-free lowercase stems. A word counts toward a polarity
//! when its folded form starts with one of that polarity's stems.

use sava_core::types::fold_accent;

/// Growth, investment and market-opening vocabulary (Spanish, then English).
pub const POSITIVE_STEMS: &[&str] = &[
    "crecimient", "crece", "inversion", "invierte", "export", "exito", "aument",
    "mejora", "subsid", "benefici", "record", "alianza", "favorab", "recupera",
    "ganancia", "apertura", "repunte", "impulsa", "growth", "grow", "invest",
    "success", "increas", "improv", "benefit", "gain", "boost", "recover", "expan",
];

/// Pest, weather, price-collapse and disruption vocabulary (Spanish, then English).
pub const NEGATIVE_STEMS: &[&str] = &[
    "crisis", "perdida", "sequia", "plaga", "helada", "caida", "paro", "bloqueo",
    "insegur", "quiebra", "deficit", "inundaci", "violencia", "desplome", "escasez",
    "afecta", "problema", "daño", "drought", "loss", "lost", "pest", "frost",
    "flood", "declin", "drop", "strike", "blockade", "damage", "destroy",
    "shortage", "bankrupt", "violence",
];

/// Positive and negative word counts for `text`.
pub fn polarity_counts(text: &str) -> (usize, usize) {
    let mut positive = 0;
    let mut negative = 0;

    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let folded: String = word.chars().map(fold_accent).collect::<String>().to_lowercase();
        if POSITIVE_STEMS.iter().any(|stem| folded.starts_with(stem)) {
            positive += 1;
        }
        if NEGATIVE_STEMS.iter().any(|stem| folded.starts_with(stem)) {
            negative += 1;
        }
    }

    (positive, negative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_spanish_vocabulary_with_accents() {
        let (pos, neg) =
            polarity_counts("Crisis y pérdidas afectan al sector por problemas de sequía.");
        assert_eq!(pos, 0);
        assert_eq!(neg, 5);
    }

    #[test]
    fn counts_english_vocabulary() {
        let (pos, neg) = polarity_counts("Investment boosts exports despite frost");
        assert_eq!(pos, 3);
        assert_eq!(neg, 1);
    }

    #[test]
    fn neutral_text_counts_nothing() {
        assert_eq!(polarity_counts("Quarterly report published"), (0, 0));
        assert_eq!(polarity_counts(""), (0, 0));
    }

    #[test]
    fn stems_are_folded_lowercase() {
        for stem in POSITIVE_STEMS.iter().chain(NEGATIVE_STEMS) {
            let folded: String = stem.chars().map(fold_accent).collect::<String>().to_lowercase();
            assert_eq!(&folded, stem);
        }
    }
}
