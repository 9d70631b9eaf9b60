//! Morphological analyzer adapter.
//!
//! Wraps an external rule-based parser behind `MorphParser` and reduces its
//! output to a single `AnalysisCandidate`: the first analysis of the first
//! parse, with a fixed subset of inflectional features. Results are memoized
//! per surface form in a bounded LRU.

use crate::collab::CollaboratorError;
use crate::grammar::{Grammar, GrammarKey};
use crate::model::{AnalysisCandidate, Source};
use crate::pos::PartOfSpeech;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::{debug, warn};

/// One reading of a surface form as reported by a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Citation form, when the parser knows it.
    pub lemma: Option<String>,
    /// Free-text or coded part-of-speech label.
    pub part_of_speech: Option<String>,
    pub senses: Vec<String>,
    /// Feature name → value, in parser order.
    pub features: Vec<(String, String)>,
}

/// One parse tree: the analyses the parser found for one segmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parse {
    pub analyses: Vec<Analysis>,
}

/// A rule-based morphological parser.
pub trait MorphParser: Send + Sync {
    /// All parses of `word`, best first. An empty list means "not a word I
    /// know", not an error.
    fn parse(&self, word: &str) -> Result<Vec<Parse>, CollaboratorError>;

    /// Source tag stamped on candidates built from this parser's output.
    fn source(&self) -> Source {
        Source::LocalAnalyzer
    }
}

/// Features copied from an analysis. Everything else the parser reports is
/// dropped.
const KEPT_FEATURES: [GrammarKey; 7] = [
    GrammarKey::Declension,
    GrammarKey::Gender,
    GrammarKey::Case,
    GrammarKey::Number,
    GrammarKey::Tense,
    GrammarKey::Mood,
    GrammarKey::Voice,
];

pub struct LocalAnalyzer {
    parser: Box<dyn MorphParser>,
    memo: Mutex<LruCache<String, Option<AnalysisCandidate>>>,
}

impl LocalAnalyzer {
    pub fn new<P: MorphParser + 'static>(parser: P, memo_capacity: usize) -> Self {
        Self::from_boxed(Box::new(parser), memo_capacity)
    }

    pub fn from_boxed(parser: Box<dyn MorphParser>, memo_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(memo_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            parser,
            memo: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Analyze a surface form.
    ///
    /// Returns `None` when the parser has no analysis. A parser error never
    /// escapes: it comes back as a failed candidate, and is not memoized so
    /// the next call asks again.
    pub fn analyze(&self, word: &str) -> Option<AnalysisCandidate> {
        if let Ok(mut memo) = self.memo.lock() {
            if let Some(hit) = memo.get(word) {
                return hit.clone();
            }
        }

        let source = self.parser.source();
        let parses = match self.parser.parse(word) {
            Ok(parses) => parses,
            Err(e) => {
                warn!(word, error = %e, "morphological parser failed");
                return Some(AnalysisCandidate::failed(word, source, e.to_string()));
            }
        };

        let candidate = parses
            .into_iter()
            .next()
            .and_then(|parse| parse.analyses.into_iter().next())
            .map(|analysis| candidate_from(word, source, analysis));
        debug!(word, found = candidate.is_some(), "local analysis");

        if let Ok(mut memo) = self.memo.lock() {
            memo.put(word.to_string(), candidate.clone());
        }
        candidate
    }

    pub fn memo_len(&self) -> usize {
        self.memo.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn memo_capacity(&self) -> usize {
        self.memo.lock().map(|m| m.cap().get()).unwrap_or(0)
    }
}

impl std::fmt::Debug for LocalAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAnalyzer")
            .field("memo_len", &self.memo_len())
            .finish()
    }
}

fn candidate_from(word: &str, source: Source, analysis: Analysis) -> AnalysisCandidate {
    let mut grammar = Grammar::new();
    for (name, value) in &analysis.features {
        match GrammarKey::from_name(name) {
            Some(key) if KEPT_FEATURES.contains(&key) && !value.is_empty() => {
                grammar.insert(key, value.as_str());
            }
            _ => {}
        }
    }
    AnalysisCandidate {
        lemma: analysis
            .lemma
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| word.to_string()),
        part_of_speech: analysis
            .part_of_speech
            .as_deref()
            .map(PartOfSpeech::from_label)
            .unwrap_or_default(),
        senses: analysis.senses,
        grammar,
        source,
        error: None,
    }
}
