//! Internal helpers for validation and key normalization.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::UnicodeNormalization;

/// Canonical lookup form of a user-supplied name: NFKC, trimmed, lowercased.
///
/// Used for per-household uniqueness of meal names so "Puré" and "pure´"
/// collide instead of silently coexisting.
pub(crate) fn normalize_lookup_key(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_key_folds_case_and_composition() {
        assert_eq!(normalize_lookup_key("  Lentejas "), "lentejas");
        // "é" precomposed vs. "e" + combining acute.
        assert_eq!(
            normalize_lookup_key("Pur\u{00e9}"),
            normalize_lookup_key("Pure\u{0301}")
        );
    }
}
