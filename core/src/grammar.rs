//! Grammatical feature mapping.
//!
//! Keys come from a closed vocabulary; values are whatever the source
//! reported ("feminine", "1st", "pres"). Insertion order is preserved and a
//! collision overwrites the value in place, so a summary rendered from the
//! mapping lists features in the order they were first seen.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarKey {
    Mood,
    Tense,
    Voice,
    Person,
    Number,
    Case,
    Gender,
    Declension,
    StemType,
    DerivType,
}

impl GrammarKey {
    pub const ALL: [GrammarKey; 10] = [
        GrammarKey::Mood,
        GrammarKey::Tense,
        GrammarKey::Voice,
        GrammarKey::Person,
        GrammarKey::Number,
        GrammarKey::Case,
        GrammarKey::Gender,
        GrammarKey::Declension,
        GrammarKey::StemType,
        GrammarKey::DerivType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarKey::Mood => "mood",
            GrammarKey::Tense => "tense",
            GrammarKey::Voice => "voice",
            GrammarKey::Person => "person",
            GrammarKey::Number => "number",
            GrammarKey::Case => "case",
            GrammarKey::Gender => "gender",
            GrammarKey::Declension => "declension",
            GrammarKey::StemType => "stemtype",
            GrammarKey::DerivType => "derivtype",
        }
    }

    /// Look up a canonical feature name. Source-specific spellings
    /// ("pers", "num") are the caller's concern.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for GrammarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered feature → value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    entries: Vec<(GrammarKey, String)>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a feature. An existing value is replaced in place and returned.
    pub fn insert<V: Into<String>>(&mut self, key: GrammarKey, value: V) -> Option<String> {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Set a feature by name. Names outside the vocabulary are dropped and
    /// `false` is returned.
    pub fn insert_named<V: Into<String>>(&mut self, name: &str, value: V) -> bool {
        match GrammarKey::from_name(name) {
            Some(key) => {
                self.insert(key, value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: GrammarKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: GrammarKey) -> bool {
        self.get(key).is_some()
    }

    /// Overlay `other` onto `self`: colliding keys take `other`'s value,
    /// keys only present in `self` are left alone.
    pub fn merge_from(&mut self, other: &Grammar) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GrammarKey, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Into<String>> FromIterator<(GrammarKey, V)> for Grammar {
    fn from_iter<I: IntoIterator<Item = (GrammarKey, V)>>(iter: I) -> Self {
        let mut grammar = Grammar::new();
        for (key, value) in iter {
            grammar.insert(key, value);
        }
        grammar
    }
}

impl Serialize for Grammar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Grammar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GrammarVisitor;

        impl<'de> Visitor<'de> for GrammarVisitor {
            type Value = Grammar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of grammatical features")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Grammar, A::Error> {
                let mut grammar = Grammar::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    // Unknown names are dropped, as on every other insertion path.
                    grammar.insert_named(&name, value);
                }
                Ok(grammar)
            }
        }

        deserializer.deserialize_map(GrammarVisitor)
    }
}
