//! Optional collaborators: synonym lookup and context lemma lookup.
//!
//! Both are capability-checked. A collaborator reports its `Availability`
//! once, when the resolver or disambiguator is constructed; an unavailable
//! one is never called and every request for it yields an "unavailable"
//! note instead.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Error type returned by collaborators. They are external code, so the
/// resolver only needs a message out of them.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Semantic lookup: lemma → synonyms.
pub trait SynonymLookup: Send + Sync {
    fn availability(&self) -> Availability {
        Availability::Available
    }

    fn synonyms(&self, lemma: &str) -> std::result::Result<Vec<String>, CollaboratorError>;
}

/// Lemmata found for one form during context lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaMatch {
    pub form: String,
    pub lemmas: Vec<String>,
}

/// Lemma lookup over a word and its neighbours.
pub trait LemmaLookup: Send + Sync {
    fn availability(&self) -> Availability {
        Availability::Available
    }

    fn lookup(&self, forms: &[String]) -> std::result::Result<Vec<LemmaMatch>, CollaboratorError>;
}

/// Synonym table loaded from a JSON object of `lemma → [synonym, ...]`.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    map: HashMap<String, Vec<String>>,
    status: Option<String>,
}

impl SynonymTable {
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Self {
        Self { map, status: None }
    }

    /// Load a synonym table. A missing file gives an unavailable table
    /// rather than an error; an unreadable or malformed one is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "synonym table not found; synonym lookup disabled");
            return Ok(Self {
                map: HashMap::new(),
                status: Some(format!("synonym table {} not found", path.display())),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let map: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;
        debug!(entries = map.len(), "loaded synonym table");
        Ok(Self::from_map(map))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl SynonymLookup for SynonymTable {
    fn availability(&self) -> Availability {
        match &self.status {
            None => Availability::Available,
            Some(reason) => Availability::Unavailable(reason.clone()),
        }
    }

    fn synonyms(&self, lemma: &str) -> std::result::Result<Vec<String>, CollaboratorError> {
        Ok(self.map.get(lemma).cloned().unwrap_or_default())
    }
}
