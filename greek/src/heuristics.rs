//! Ending-based heuristics for Greek headwords.
//!
//! All tables are first-match-wins and compare accent-folded text, so
//! "-ου" and "-οῦ" classify the same way. A table row whose result is
//! `None` marks an ending as known-ambiguous: it stops the search without
//! producing a guess.

use once_cell::sync::Lazy;
use regex::Regex;
use scholia_core::Gender;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip accents, breathings, diaeresis and iota subscript.
pub fn fold_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

static GREEK_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\u{0370}-\u{03FF}\u{1F00}-\u{1FFF}]+$").expect("static pattern"));

/// True for a non-empty run of Greek and Greek Extended characters.
pub fn is_greek_word(s: &str) -> bool {
    GREEK_WORD.is_match(s)
}

/// A dash-prefixed ending marker such as "-ου" or "–ον".
pub fn is_dash_marker(s: &str) -> bool {
    s.starts_with('-') || s.starts_with('–')
}

/// Genitive ending (exact, folded) → gender.
const GENITIVE_ENDINGS: [(&str, Option<Gender>); 7] = [
    ("ου", Some(Gender::Masculine)),
    ("ης", Some(Gender::Feminine)),
    ("ας", Some(Gender::Feminine)),
    // third declension: any gender
    ("ους", None),
    ("εος", None),
    ("εως", None),
    ("ματος", None),
];

/// Nominative suffix (folded) → gender.
const NOMINATIVE_ENDINGS: [(&str, Option<Gender>); 10] = [
    ("ος", Some(Gender::Masculine)),
    ("ον", Some(Gender::Neuter)),
    ("η", Some(Gender::Feminine)),
    ("α", Some(Gender::Feminine)),
    ("ις", None),
    ("υς", None),
    ("ξ", None),
    ("ψ", None),
    ("ρ", None),
    ("ν", None),
];

const MASCULINE_ENDINGS: [&str; 3] = ["ος", "ης", "ας"];

/// Gender implied by a genitive ending like "-ου". Ambiguous or unknown
/// endings give `None`.
pub fn gender_from_genitive(genitive: &str) -> Option<Gender> {
    let ending = fold_accents(genitive.trim().trim_start_matches(['-', '–'])).to_lowercase();
    GENITIVE_ENDINGS
        .iter()
        .find(|(e, _)| *e == ending)
        .and_then(|(_, g)| *g)
}

/// Gender implied by the nominative form itself.
pub fn gender_from_nominative(lemma: &str) -> Option<Gender> {
    let folded = fold_accents(lemma).to_lowercase();
    NOMINATIVE_ENDINGS
        .iter()
        .find(|(e, _)| folded.ends_with(e))
        .and_then(|(_, g)| *g)
}

pub fn looks_masculine(lemma: &str) -> bool {
    let folded = fold_accents(lemma).to_lowercase();
    MASCULINE_ENDINGS.iter().any(|e| folded.ends_with(e))
}

static DECLENSION_ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d)(?:st|nd|rd|th)?\s*(?:and\s*\d+(?:st|nd|rd|th)?)?\s*decl")
        .expect("static pattern")
});
static DECLENSION_AFTER_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*(\d)").expect("static pattern"));

/// Declension number from a part-of-speech label
/// ("noun: 2nd declension" → 2, "adjective: 1st and 2nd declension" → 1).
pub fn extract_declension(label: &str) -> Option<u8> {
    let lower = label.to_lowercase();
    DECLENSION_ORDINAL
        .captures(&lower)
        .or_else(|| DECLENSION_AFTER_COLON.captures(label))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_removes_all_marks() {
        assert_eq!(fold_accents("ἄνθρωπος"), "ανθρωπος");
        assert_eq!(fold_accents("τῇ"), "τη");
    }

    #[test]
    fn genitive_table() {
        assert_eq!(gender_from_genitive("-ου"), Some(Gender::Masculine));
        assert_eq!(gender_from_genitive("–οῦ"), Some(Gender::Masculine));
        assert_eq!(gender_from_genitive("-ῆς"), Some(Gender::Feminine));
        assert_eq!(gender_from_genitive("-ας"), Some(Gender::Feminine));
    }

    #[test]
    fn ambiguous_genitives_never_guess() {
        for g in ["-ους", "-εος", "-έως", "-ματος", "-ος", "-xyz"] {
            assert_eq!(gender_from_genitive(g), None, "{}", g);
        }
    }

    #[test]
    fn nominative_table() {
        assert_eq!(gender_from_nominative("λόγος"), Some(Gender::Masculine));
        assert_eq!(gender_from_nominative("ἔργον"), Some(Gender::Neuter));
        assert_eq!(gender_from_nominative("τιμή"), Some(Gender::Feminine));
        assert_eq!(gender_from_nominative("χώρα"), Some(Gender::Feminine));
        assert_eq!(gender_from_nominative("πόλις"), None);
        assert_eq!(gender_from_nominative("φύλαξ"), None);
        assert_eq!(gender_from_nominative("ἀγών"), None);
    }

    #[test]
    fn masculine_shape() {
        assert!(looks_masculine("ἀγαθός"));
        assert!(looks_masculine("νεανίας"));
        assert!(!looks_masculine("ἡδύ"));
    }

    #[test]
    fn greek_word_pattern() {
        assert!(is_greek_word("αὐτή"));
        assert!(!is_greek_word("αὐτή,"));
        assert!(!is_greek_word("auto"));
        assert!(!is_greek_word(""));
    }

    #[test]
    fn declension_from_label() {
        assert_eq!(extract_declension("noun: 2nd declension"), Some(2));
        assert_eq!(extract_declension("adjective: 1st and 2nd declension"), Some(1));
        assert_eq!(extract_declension("noun: 3"), Some(3));
        assert_eq!(extract_declension("verb"), None);
    }
}
