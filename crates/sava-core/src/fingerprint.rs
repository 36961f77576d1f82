// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content fingerprints used as result-store keys.

use sha2::{Digest, Sha256};

/// Trim surrounding whitespace and lowercase.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Hex SHA-256 of the normalized text.
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(normalize(text).as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trailing_space_and_case_do_not_matter() {
        assert_eq!(
            fingerprint("Rain hurts crops "),
            fingerprint("rain hurts crops")
        );
        assert_eq!(fingerprint("  SEQUÍA  "), fingerprint("sequía"));
    }

    #[test]
    fn different_text_different_fingerprint() {
        assert_ne!(fingerprint("rain hurts crops"), fingerprint("rain helps crops"));
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let fp = fingerprint("");
        assert_eq!(fp.len(), 64);
        assert_eq!(
            fp,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    proptest! {
        #[test]
        fn fingerprint_matches_normalized(text in "[ \\ta-zA-Z0-9áéíóúÁÉÍÓÚñÑ.,]{0,64}") {
            prop_assert_eq!(fingerprint(&text), fingerprint(&normalize(&text)));
        }
    }
}
