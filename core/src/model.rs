//! Records passed through the resolution pipeline.

use crate::collab::LemmaMatch;
use crate::grammar::Grammar;
use crate::pos::PartOfSpeech;
use serde::{Deserialize, Serialize};

/// Where an analysis came from. Precedence when merging is remote service
/// over local analyzer; static lexicon data reaches the resolver through the
/// local analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    LocalAnalyzer,
    RemoteService,
    StaticLexicon,
}

/// One source's opinion about a surface form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCandidate {
    pub lemma: String,
    pub part_of_speech: PartOfSpeech,
    /// Source order, not alphabetical.
    pub senses: Vec<String>,
    pub grammar: Grammar,
    pub source: Source,
    /// Set when the source failed; the other fields are then placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisCandidate {
    pub fn new<S: Into<String>>(lemma: S, source: Source) -> Self {
        Self {
            lemma: lemma.into(),
            part_of_speech: PartOfSpeech::Unknown,
            senses: Vec::new(),
            grammar: Grammar::new(),
            source,
            error: None,
        }
    }

    /// A candidate that only carries a failure note.
    pub fn failed<S: Into<String>, M: Into<String>>(word: S, source: Source, message: M) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(word, source)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Which step of resolution a note refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteSource {
    LocalAnalyzer,
    RemoteService,
    SynonymLookup,
    ContextLookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKind {
    /// The collaborator was asked and failed.
    Failure,
    /// The collaborator is not present; nothing was asked.
    Unavailable,
}

/// A non-fatal problem recorded while resolving a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub source: NoteSource,
    pub kind: NoteKind,
    pub message: String,
}

/// A link into an external dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub url: String,
}

/// Output of the context lookup, attached by the disambiguator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub analyzed: bool,
    pub lemmas: Vec<LemmaMatch>,
}

/// The merged record for one surface form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDefinition {
    /// Surface form as resolved (NFC, trimmed).
    pub word: String,
    pub lemma: String,
    pub part_of_speech: PartOfSpeech,
    /// Deduplicated by exact string equality; source priority order.
    pub senses: Vec<String>,
    pub grammar: Grammar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextAnalysis>,
    /// Commentary rendering, filled in once every other field is final.
    #[serde(default)]
    pub formatted: String,
}

impl ResolvedDefinition {
    /// An empty record whose lemma defaults to the word itself.
    pub fn new<S: Into<String>>(word: S) -> Self {
        let word = word.into();
        Self {
            lemma: word.clone(),
            word,
            part_of_speech: PartOfSpeech::Unknown,
            senses: Vec::new(),
            grammar: Grammar::new(),
            synonyms: None,
            references: Vec::new(),
            errors: Vec::new(),
            context: None,
            formatted: String::new(),
        }
    }

    /// Append a sense unless an identical string is already present.
    pub fn push_sense<S: Into<String>>(&mut self, sense: S) -> bool {
        let sense = sense.into();
        if self.senses.contains(&sense) {
            return false;
        }
        self.senses.push(sense);
        true
    }

    /// Put `senses` in front of the existing list, keeping their relative
    /// order and skipping strings already present.
    pub fn prepend_senses<I, S>(&mut self, senses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut front: Vec<String> = Vec::new();
        for sense in senses {
            let sense = sense.into();
            if !self.senses.contains(&sense) && !front.contains(&sense) {
                front.push(sense);
            }
        }
        front.append(&mut self.senses);
        self.senses = front;
    }

    pub fn note<M: Into<String>>(&mut self, source: NoteSource, kind: NoteKind, message: M) {
        self.errors.push(Note {
            source,
            kind,
            message: message.into(),
        });
    }

    /// True when any step failed or was skipped for lack of a collaborator.
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn notes_from(&self, source: NoteSource) -> impl Iterator<Item = &Note> + '_ {
        self.errors.iter().filter(move |n| n.source == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_sense_is_exact_match_dedup() {
        let mut def = ResolvedDefinition::new("amo");
        assert!(def.push_sense("love"));
        assert!(!def.push_sense("love"));
        // Near-duplicates are kept.
        assert!(def.push_sense("Love"));
        assert!(def.push_sense("love "));
        assert_eq!(def.senses.len(), 3);
    }

    #[test]
    fn prepend_keeps_remote_order_and_skips_known() {
        let mut def = ResolvedDefinition::new("amo");
        def.push_sense("like");
        def.push_sense("love");
        def.prepend_senses(["to love", "love", "to cherish", "to love"]);
        assert_eq!(def.senses, vec!["to love", "to cherish", "like", "love"]);
    }

    #[test]
    fn lemma_defaults_to_word() {
        let def = ResolvedDefinition::new("puellae");
        assert_eq!(def.lemma, "puellae");
        assert!(!def.is_degraded());
    }

    #[test]
    fn notes_are_filterable_by_source() {
        let mut def = ResolvedDefinition::new("x");
        def.note(NoteSource::RemoteService, NoteKind::Failure, "timeout");
        def.note(NoteSource::SynonymLookup, NoteKind::Unavailable, "no table");
        assert!(def.is_degraded());
        assert_eq!(def.notes_from(NoteSource::RemoteService).count(), 1);
    }

    #[test]
    fn failed_candidate_carries_only_the_note() {
        let c = AnalysisCandidate::failed("amo", Source::LocalAnalyzer, "boom");
        assert!(c.is_failed());
        assert!(c.senses.is_empty());
        assert!(c.part_of_speech.is_unknown());
    }
}
