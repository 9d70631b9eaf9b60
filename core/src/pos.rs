//! Part-of-speech vocabulary and label classification.
//!
//! Sources name parts of speech in many ways: Whitaker-style codes (`V`,
//! `ADJ`), Morpheus words (`verb`, `adjective`) and free-text dictionary
//! labels (`noun: 2nd declension`, `deponent verb`). Everything funnels into
//! the fixed `PartOfSpeech` enum here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PartOfSpeech {
    #[serde(rename = "verb")]
    Verb,
    #[serde(rename = "noun")]
    Noun,
    #[serde(rename = "adj")]
    Adjective,
    #[serde(rename = "adv")]
    Adverb,
    #[serde(rename = "pron")]
    Pronoun,
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "prep")]
    Preposition,
    #[serde(rename = "conj")]
    Conjunction,
    #[serde(rename = "particle")]
    Particle,
    #[serde(rename = "interjection")]
    Interjection,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

/// Free-text label rules, evaluated in priority order; first match wins.
///
/// Patterns are anchored at a word start so that "adverb" does not fall
/// into the verb rule and "pronoun" does not fall into the noun rule.
static LABEL_RULES: Lazy<Vec<(Regex, PartOfSpeech)>> = Lazy::new(|| {
    [
        (r"\bverb", PartOfSpeech::Verb),
        (r"\bnoun", PartOfSpeech::Noun),
        (r"\b(adjective|numeral)", PartOfSpeech::Adjective),
        (r"\badverb", PartOfSpeech::Adverb),
        (r"\bpronoun", PartOfSpeech::Pronoun),
        (r"\barticle", PartOfSpeech::Article),
        (r"\bpreposition", PartOfSpeech::Preposition),
        (r"\bconjunction", PartOfSpeech::Conjunction),
        (r"\bparticle", PartOfSpeech::Particle),
        (r"\binterjection", PartOfSpeech::Interjection),
    ]
    .into_iter()
    .map(|(pattern, pos)| {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("static label pattern");
        (re, pos)
    })
    .collect()
});

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
            PartOfSpeech::Pronoun => "pron",
            PartOfSpeech::Article => "article",
            PartOfSpeech::Preposition => "prep",
            PartOfSpeech::Conjunction => "conj",
            PartOfSpeech::Particle => "particle",
            PartOfSpeech::Interjection => "interjection",
            PartOfSpeech::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, PartOfSpeech::Unknown)
    }

    /// Classify a free-text part-of-speech label by the priority-ordered
    /// rule table. Returns `None` when no rule matches.
    ///
    /// Each rule matches at a word start, not anywhere in the label:
    /// "adverb" is an adverb, never a verb.
    pub fn classify_label(label: &str) -> Option<Self> {
        LABEL_RULES
            .iter()
            .find(|(re, _)| re.is_match(label))
            .map(|(_, pos)| *pos)
    }

    /// Interpret a label coming from an analyzer or service.
    ///
    /// Short codes and canonical names are matched exactly first; anything
    /// else goes through `classify_label`. Unrecognised labels are `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        let exact = match lower.as_str() {
            "v" | "verb" | "vpar" | "participle" | "supine" => Some(PartOfSpeech::Verb),
            "n" | "noun" => Some(PartOfSpeech::Noun),
            "adj" | "adjective" | "num" | "numeral" => Some(PartOfSpeech::Adjective),
            "adv" | "adverb" => Some(PartOfSpeech::Adverb),
            "pron" | "pronoun" | "pack" => Some(PartOfSpeech::Pronoun),
            "art" | "article" => Some(PartOfSpeech::Article),
            "prep" | "preposition" => Some(PartOfSpeech::Preposition),
            "conj" | "conjunction" => Some(PartOfSpeech::Conjunction),
            "part" | "particle" => Some(PartOfSpeech::Particle),
            "interj" | "interjection" | "exclamation" => Some(PartOfSpeech::Interjection),
            _ => None,
        };
        exact
            .or_else(|| Self::classify_label(&lower))
            .unwrap_or(PartOfSpeech::Unknown)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_priority_verb_before_noun() {
        assert_eq!(
            PartOfSpeech::classify_label("verb; noun-like usage"),
            Some(PartOfSpeech::Verb)
        );
        assert_eq!(
            PartOfSpeech::classify_label("Noun: 2nd declension"),
            Some(PartOfSpeech::Noun)
        );
    }

    #[test]
    fn adverb_and_pronoun_are_not_swallowed() {
        assert_eq!(PartOfSpeech::classify_label("adverb"), Some(PartOfSpeech::Adverb));
        assert_eq!(
            PartOfSpeech::classify_label("demonstrative pronoun"),
            Some(PartOfSpeech::Pronoun)
        );
    }

    #[test]
    fn numeral_maps_to_adjective() {
        assert_eq!(
            PartOfSpeech::classify_label("numeral"),
            Some(PartOfSpeech::Adjective)
        );
    }

    #[test]
    fn unmatched_label_is_none() {
        assert_eq!(PartOfSpeech::classify_label("enclitic"), None);
        assert_eq!(PartOfSpeech::from_label("enclitic"), PartOfSpeech::Unknown);
    }

    #[test]
    fn short_codes() {
        assert_eq!(PartOfSpeech::from_label("V"), PartOfSpeech::Verb);
        assert_eq!(PartOfSpeech::from_label("ADJ"), PartOfSpeech::Adjective);
        assert_eq!(PartOfSpeech::from_label(" conj "), PartOfSpeech::Conjunction);
    }

    #[test]
    fn serde_uses_short_names() {
        let json = serde_json::to_string(&PartOfSpeech::Adjective).unwrap();
        assert_eq!(json, "\"adj\"");
        let back: PartOfSpeech = serde_json::from_str("\"verb\"").unwrap();
        assert_eq!(back, PartOfSpeech::Verb);
    }
}
