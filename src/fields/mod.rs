//! Canonical comparison keys for field names.
//!
//! Header validation uses [`similar_strict`]; cross-base drift detection uses
//! the looser [`similar_loose`], which also accepts one key contained in the
//! other.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::VariantKind;

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Canonical key of a field name: transliterated to ASCII, parenthesized
/// parts removed, only letters and digits kept, lowercased.
pub fn normalize_field(name: &str) -> String {
    let ascii = deunicode(name);
    let without_groups = PARENTHESIZED.replace_all(&ascii, "");

    without_groups
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Keys are equal and not empty
pub fn similar_strict(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_field(a), normalize_field(b));
    !a.is_empty() && a == b
}

/// Keys are equal, or one contains the other. Both must be non-empty.
///
/// Short keys match inside unrelated longer ones ("id" in "validade").
pub fn similar_loose(a: &str, b: &str) -> bool {
    let (a, b) = (normalize_field(a), normalize_field(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Spacing when the two names only differ in whitespace
pub fn classify_variant(variant: &str, required: &str) -> VariantKind {
    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();

    if strip(variant) == strip(required) {
        VariantKind::Spacing
    } else {
        VariantKind::AccentOrCharacter
    }
}
