//! Context disambiguation.
//!
//! Given the words around a form, ask a lemma-lookup collaborator what the
//! neighbourhood lemmatizes to and attach that to the resolved record. The
//! signal is exposed on `ResolvedDefinition::context`; sense order is left
//! exactly as resolved.

use crate::collab::{Availability, LemmaLookup};
use crate::model::{ContextAnalysis, NoteKind, NoteSource, ResolvedDefinition};
use tracing::{debug, warn};

pub struct ContextDisambiguator {
    lookup: Option<Box<dyn LemmaLookup>>,
    availability: Availability,
}

impl ContextDisambiguator {
    /// Availability is checked once, here.
    pub fn new<L: LemmaLookup + 'static>(lookup: L) -> Self {
        Self::from_boxed(Some(Box::new(lookup)))
    }

    /// A disambiguator with no lookup behind it; every multi-sense request
    /// gets an "unavailable" note.
    pub fn unavailable() -> Self {
        Self::from_boxed(None)
    }

    pub fn from_boxed(lookup: Option<Box<dyn LemmaLookup>>) -> Self {
        let availability = match &lookup {
            Some(l) => l.availability(),
            None => Availability::Unavailable("no lemma lookup configured".into()),
        };
        if let Availability::Unavailable(reason) = &availability {
            debug!(reason = %reason, "context lookup unavailable");
        }
        Self {
            lookup,
            availability,
        }
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Attach context lemmata to `resolved`.
    ///
    /// A record with at most one sense comes back unchanged. Otherwise the
    /// lookup is seeded with `word` followed by `context`; on success the
    /// result carries a `ContextAnalysis`, on failure a note.
    pub fn disambiguate(
        &self,
        word: &str,
        context: &[String],
        resolved: &ResolvedDefinition,
    ) -> ResolvedDefinition {
        let mut out = resolved.clone();
        if resolved.senses.len() <= 1 {
            return out;
        }

        let lookup = match (&self.lookup, &self.availability) {
            (Some(lookup), Availability::Available) => lookup,
            (_, Availability::Unavailable(reason)) => {
                out.note(NoteSource::ContextLookup, NoteKind::Unavailable, reason.clone());
                return out;
            }
            (None, Availability::Available) => return out,
        };

        let mut forms = Vec::with_capacity(context.len() + 1);
        forms.push(word.to_string());
        forms.extend(context.iter().cloned());

        match lookup.lookup(&forms) {
            Ok(lemmas) => {
                debug!(word, found = lemmas.len(), "context lookup");
                out.context = Some(ContextAnalysis {
                    analyzed: true,
                    lemmas,
                });
            }
            Err(e) => {
                warn!(word, error = %e, "context lookup failed");
                out.note(NoteSource::ContextLookup, NoteKind::Failure, e.to_string());
            }
        }
        out
    }
}

impl std::fmt::Debug for ContextDisambiguator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextDisambiguator")
            .field("availability", &self.availability)
            .finish()
    }
}
