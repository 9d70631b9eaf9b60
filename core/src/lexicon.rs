//! Static lexicon container.
//!
//! A `Lexicon` maps a lookup key (a lemma or one of its alternate forms) to a
//! shared, immutable `LexiconEntry`. Loaders build one per source file;
//! lookups hand out `Arc`s, so an alias and its lemma key point at the same
//! entry and neither can be written through.
//!
//! Public API:
//! - `LexiconEntry` - lemma with part of speech, gender, genitive, senses
//!   and verb principal parts
//! - `Lexicon` - insert / alias / lookup, plus `MorphParser` and
//!   `LemmaLookup` implementations so loaded data can take part in
//!   resolution and context lookup

use crate::analyzer::{Analysis, MorphParser, Parse};
use crate::collab::{CollaboratorError, LemmaLookup, LemmaMatch};
use crate::grammar::{Grammar, GrammarKey};
use crate::model::{AnalysisCandidate, Source};
use crate::pos::PartOfSpeech;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
            Gender::Neuter => "neuter",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six conventional verb stems, in citation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalParts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aorist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect_active: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect_middle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aorist_passive: Option<String>,
}

impl PrincipalParts {
    pub const SLOTS: usize = 6;

    /// Slot by citation position (0 = present … 5 = aorist passive).
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Option<String>> {
        match index {
            0 => Some(&mut self.present),
            1 => Some(&mut self.future),
            2 => Some(&mut self.aorist),
            3 => Some(&mut self.perfect_active),
            4 => Some(&mut self.perfect_middle),
            5 => Some(&mut self.aorist_passive),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        [
            &self.present,
            &self.future,
            &self.aorist,
            &self.perfect_active,
            &self.perfect_middle,
            &self.aorist_passive,
        ]
        .into_iter()
        .filter_map(|slot| slot.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// One headword from a static dictionary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub lemma: String,
    pub part_of_speech: PartOfSpeech,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declension: Option<u8>,
    /// Genitive ending as printed in the source (e.g. "-ου").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genitive: Option<String>,
    pub senses: Vec<String>,
    #[serde(default, skip_serializing_if = "PrincipalParts::is_empty")]
    pub principal_parts: PrincipalParts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_group: Option<String>,
}

impl LexiconEntry {
    pub fn new<S: Into<String>>(lemma: S, part_of_speech: PartOfSpeech) -> Self {
        Self {
            lemma: lemma.into(),
            part_of_speech,
            gender: None,
            declension: None,
            genitive: None,
            senses: Vec::new(),
            principal_parts: PrincipalParts::default(),
            frequency_rank: None,
            semantic_group: None,
        }
    }

    /// Gender and declension as grammar features.
    pub fn grammar(&self) -> Grammar {
        let mut grammar = Grammar::new();
        if let Some(d) = self.declension {
            grammar.insert(GrammarKey::Declension, d.to_string());
        }
        if let Some(g) = self.gender {
            grammar.insert(GrammarKey::Gender, g.as_str());
        }
        grammar
    }

    pub fn to_candidate(&self) -> AnalysisCandidate {
        AnalysisCandidate {
            lemma: self.lemma.clone(),
            part_of_speech: self.part_of_speech,
            senses: self.senses.clone(),
            grammar: self.grammar(),
            source: Source::StaticLexicon,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lexicon {
    entries: HashMap<String, Arc<LexiconEntry>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under its lemma, replacing any entry already keyed
    /// there. Returns the shared handle for registering aliases.
    pub fn insert(&mut self, entry: LexiconEntry) -> Arc<LexiconEntry> {
        let entry = Arc::new(entry);
        self.entries.insert(entry.lemma.clone(), entry.clone());
        entry
    }

    /// Register `form` as another key for `entry`. An existing key is never
    /// overwritten; returns whether the alias was added.
    pub fn insert_alias<K: Into<String>>(&mut self, form: K, entry: &Arc<LexiconEntry>) -> bool {
        let form = form.into();
        if self.entries.contains_key(&form) {
            return false;
        }
        self.entries.insert(form, entry.clone());
        true
    }

    pub fn get(&self, form: &str) -> Option<&Arc<LexiconEntry>> {
        self.entries.get(form)
    }

    pub fn contains(&self, form: &str) -> bool {
        self.entries.contains_key(form)
    }

    /// Lemma of the entry `form` resolves to.
    pub fn lemma_of(&self, form: &str) -> Option<&str> {
        self.entries.get(form).map(|e| e.lemma.as_str())
    }

    /// Number of keys, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All lookup keys, in no particular order.
    pub fn forms(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<LexiconEntry>)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add every key of `other` that `self` does not have yet. Returns the
    /// number of keys added.
    pub fn merge_missing(&mut self, other: &Lexicon) -> usize {
        let mut added = 0;
        for (form, entry) in &other.entries {
            if !self.entries.contains_key(form) {
                self.entries.insert(form.clone(), entry.clone());
                added += 1;
            }
        }
        added
    }
}

impl MorphParser for Lexicon {
    fn parse(&self, word: &str) -> Result<Vec<Parse>, CollaboratorError> {
        let Some(entry) = self.get(word) else {
            return Ok(Vec::new());
        };
        let features = entry
            .grammar()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_string()))
            .collect();
        Ok(vec![Parse {
            analyses: vec![Analysis {
                lemma: Some(entry.lemma.clone()),
                part_of_speech: Some(entry.part_of_speech.as_str().to_string()),
                senses: entry.senses.clone(),
                features,
            }],
        }])
    }

    fn source(&self) -> Source {
        Source::StaticLexicon
    }
}

impl LemmaLookup for Lexicon {
    fn lookup(&self, forms: &[String]) -> Result<Vec<LemmaMatch>, CollaboratorError> {
        Ok(forms
            .iter()
            .filter_map(|form| {
                self.lemma_of(form).map(|lemma| LemmaMatch {
                    form: form.clone(),
                    lemmas: vec![lemma.to_string()],
                })
            })
            .collect())
    }
}
