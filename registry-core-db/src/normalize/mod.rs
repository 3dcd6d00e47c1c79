//! Canonical forms for free-text site identifiers.
//!
//! Every rule is a separate function so callers and tests can apply them one
//! at a time; [`normalize`] chains them. Canonical forms are for comparison
//! only and are never written back to storage.

pub mod diacritics;

use serde::{Deserialize, Serialize};

use diacritics::{base_letters, is_combining_mark};

/// Serial values the importer wrote when the sheet had none.
const SERIAL_PLACEHOLDERS: [&str; 6] = ["SIN_SERIE", "SIN SERIE", "S/N", "SN", "N/A", "NA"];

/// Trims and collapses internal whitespace runs to a single space.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case fold.
pub fn fold_case(raw: &str) -> String {
    raw.to_lowercase()
}

/// Replaces accented letters through the fixed table and drops combining marks.
pub fn strip_diacritics(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if is_combining_mark(c) {
            continue;
        }
        match base_letters(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

/// Canonical comparison form of an identifier.
///
/// Whitespace is collapsed last: dropping a combining mark that stood alone
/// between two spaces must not leave a double space behind.
pub fn normalize(raw: &str) -> String {
    collapse_whitespace(&strip_diacritics(&fold_case(raw)))
}

/// Region names arrive as "FIR Mendoza" as often as "Mendoza".
pub fn normalize_region_name(raw: &str) -> String {
    let canonical = normalize(raw);
    match canonical.strip_prefix("fir ") {
        Some(rest) => rest.to_string(),
        None => canonical,
    }
}

/// Serial in comparison form: trimmed, collapsed and upper-cased.
///
/// Returns `None` for blanks, the importer placeholders and the synthetic
/// `S/N-<row>` values generated for rows without a serial.
pub fn normalize_serial(raw: &str) -> Option<String> {
    let serial = collapse_whitespace(raw).to_ascii_uppercase();
    if serial.is_empty() || SERIAL_PLACEHOLDERS.contains(&serial.as_str()) {
        return None;
    }
    if let Some(suffix) = serial.strip_prefix("S/N-") {
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    Some(serial)
}

/// What shape a canonical identifier has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierToken {
    Empty,
    /// Three letters: a local designator, never scored as a name fragment.
    Code(String),
    /// Four letters: may be an ICAO indicator, may still be a short name.
    Icao(String),
    Name(String),
}

impl IdentifierToken {
    pub fn as_str(&self) -> &str {
        match self {
            IdentifierToken::Empty => "",
            IdentifierToken::Code(s) | IdentifierToken::Icao(s) | IdentifierToken::Name(s) => s,
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, IdentifierToken::Code(_))
    }
}

/// Classifies an already normalized identifier.
pub fn classify(canonical: &str) -> IdentifierToken {
    let letters_only = canonical.chars().all(|c| c.is_ascii_alphabetic());
    match canonical.chars().count() {
        0 => IdentifierToken::Empty,
        3 if letters_only => IdentifierToken::Code(canonical.to_string()),
        4 if letters_only => IdentifierToken::Icao(canonical.to_string()),
        _ => IdentifierToken::Name(canonical.to_string()),
    }
}

/// Normalizes and classifies in one step.
pub fn tokenize(raw: &str) -> IdentifierToken {
    classify(&normalize(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  San   Rafael \t "), "San Rafael");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_fold_case_keeps_accents() {
        assert_eq!(fold_case("MALARGÜE"), "malargüe");
    }

    #[test]
    fn test_strip_diacritics_keeps_case() {
        assert_eq!(strip_diacritics("Malargüe"), "Malargue");
        assert_eq!(strip_diacritics("Río Gallegos"), "Rio Gallegos");
    }

    #[test]
    fn test_strip_decomposed_marks() {
        // "u" followed by a combining diaeresis
        assert_eq!(strip_diacritics("Malargu\u{0308}e"), "Malargue");
    }

    #[test]
    fn test_accent_insensitive() {
        assert_eq!(normalize("Malargüe"), normalize("Malargue"));
        assert_eq!(normalize("  MALARGÜE "), "malargue");
        assert_eq!(normalize("Malargu\u{0308}e"), "malargue");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Malargüe",
            "  San   Rafael ",
            "Córdoba - Ing. Taravella",
            "a \u{0301} b",
            "İstanbul",
            "STRASSE ß",
            "",
            "MLG",
            "ÆRØ",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_lone_combining_mark_leaves_no_double_space() {
        assert_eq!(normalize("a \u{0301} b"), "a b");
    }

    #[test]
    fn test_region_prefix_is_ignored() {
        assert_eq!(normalize_region_name("FIR Mendoza"), "mendoza");
        assert_eq!(normalize_region_name("fir   MENDOZA"), "mendoza");
        assert_eq!(normalize_region_name("Mendoza"), "mendoza");
        assert_eq!(normalize_region_name("Firmat"), "firmat");
    }

    #[test]
    fn test_serial_placeholders_are_null() {
        assert_eq!(normalize_serial("  "), None);
        assert_eq!(normalize_serial("sin_serie"), None);
        assert_eq!(normalize_serial("S/N"), None);
        assert_eq!(normalize_serial("S/N-42"), None);
        assert_eq!(normalize_serial(" ab  123 "), Some("AB 123".to_string()));
        assert_eq!(normalize_serial("S/N-A1"), Some("S/N-A1".to_string()));
    }

    #[test]
    fn test_three_letters_are_a_code() {
        assert_eq!(tokenize(" MLG "), IdentifierToken::Code("mlg".to_string()));
        assert!(tokenize("MLG").is_code());
    }

    #[test]
    fn test_four_letters_are_icao_candidates() {
        assert_eq!(tokenize("SAMM"), IdentifierToken::Icao("samm".to_string()));
    }

    #[test]
    fn test_other_shapes_are_names() {
        assert_eq!(tokenize("ML1"), IdentifierToken::Name("ml1".to_string()));
        assert_eq!(tokenize("Malargüe"), IdentifierToken::Name("malargue".to_string()));
        assert_eq!(tokenize("San Luis"), IdentifierToken::Name("san luis".to_string()));
        assert_eq!(tokenize("   "), IdentifierToken::Empty);
    }
}
