// core/src/resolver.rs
//
// Definition resolver: merges the local analyzer, the remote service and the
// optional collaborators into one cached record per surface form.

use crate::analyzer::{LocalAnalyzer, MorphParser};
use crate::cache::{Cache, CacheStore};
use crate::collab::{Availability, LemmaLookup, SynonymLookup};
use crate::config::Config;
use crate::context::ContextDisambiguator;
use crate::error::Result;
use crate::format;
use crate::language::Language;
use crate::model::{AnalysisCandidate, NoteKind, NoteSource, ResolvedDefinition};
use crate::remote::RemoteAnalyzer;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which optional steps `resolve` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    pub use_remote: bool,
    pub include_grammar: bool,
    pub include_synonyms: bool,
    pub include_references: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            use_remote: true,
            include_grammar: true,
            include_synonyms: true,
            include_references: true,
        }
    }
}

impl ResolveOptions {
    /// Everything except the network.
    pub fn offline() -> Self {
        Self {
            use_remote: false,
            ..Self::default()
        }
    }

    /// Stable flag string used in cache keys, e.g. `r1g1s0x1`.
    pub fn cache_tag(&self) -> String {
        format!(
            "r{}g{}s{}x{}",
            self.use_remote as u8,
            self.include_grammar as u8,
            self.include_synonyms as u8,
            self.include_references as u8
        )
    }
}

/// Builder for `Resolver`. Only the morphological parser is required.
pub struct ResolverBuilder {
    parser: Box<dyn MorphParser>,
    remote: Option<Box<dyn RemoteAnalyzer>>,
    synonyms: Option<Box<dyn SynonymLookup>>,
    lemma_lookup: Option<Box<dyn LemmaLookup>>,
    language: Language,
    store: Option<Arc<CacheStore>>,
    flush_every: usize,
    memo_capacity: usize,
}

impl ResolverBuilder {
    pub fn remote<R: RemoteAnalyzer + 'static>(mut self, remote: R) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    pub fn synonyms<S: SynonymLookup + 'static>(mut self, synonyms: S) -> Self {
        self.synonyms = Some(Box::new(synonyms));
        self
    }

    pub fn lemma_lookup<L: LemmaLookup + 'static>(mut self, lookup: L) -> Self {
        self.lemma_lookup = Some(Box::new(lookup));
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Backing store for resolved records. Defaults to an in-memory store.
    pub fn cache_store(mut self, store: Arc<CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn flush_every(mut self, n: usize) -> Self {
        self.flush_every = n;
        self
    }

    pub fn memo_capacity(mut self, n: usize) -> Self {
        self.memo_capacity = n;
        self
    }

    /// Take language, cache cadence and memo size from `config`.
    pub fn config(self, config: &Config) -> Self {
        self.language(config.language)
            .flush_every(config.cache.flush_every)
            .memo_capacity(config.analyzer.memo_capacity)
    }

    pub fn build(self) -> Resolver {
        let synonym_availability = match &self.synonyms {
            Some(s) => s.availability(),
            None => Availability::Unavailable("no synonym lookup configured".into()),
        };
        let store = self.store.unwrap_or_else(CacheStore::in_memory);
        Resolver {
            analyzer: LocalAnalyzer::from_boxed(self.parser, self.memo_capacity),
            remote: self.remote,
            synonyms: self.synonyms,
            synonym_availability,
            disambiguator: ContextDisambiguator::from_boxed(self.lemma_lookup),
            language: self.language,
            cache: Cache::new(store, self.flush_every),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

/// Resolves surface forms into `ResolvedDefinition`s.
///
/// `resolve` never fails: every collaborator problem ends up as a note on
/// the returned record. Records are cached per (word, options).
pub struct Resolver {
    analyzer: LocalAnalyzer,
    remote: Option<Box<dyn RemoteAnalyzer>>,
    synonyms: Option<Box<dyn SynonymLookup>>,
    synonym_availability: Availability,
    disambiguator: ContextDisambiguator,
    language: Language,
    cache: Cache<ResolvedDefinition>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Resolver {
    pub fn builder<P: MorphParser + 'static>(parser: P) -> ResolverBuilder {
        Self::builder_boxed(Box::new(parser))
    }

    pub fn builder_boxed(parser: Box<dyn MorphParser>) -> ResolverBuilder {
        ResolverBuilder {
            parser,
            remote: None,
            synonyms: None,
            lemma_lookup: None,
            language: Language::default(),
            store: None,
            flush_every: 10,
            memo_capacity: 1000,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn cache_key(word: &str, options: &ResolveOptions) -> String {
        format!("definition:{}:{}", word, options.cache_tag())
    }

    /// Resolve one surface form.
    ///
    /// 1. Cache lookup on (normalized word, options)
    /// 2. Local analyzer seeds lemma and senses; part of speech and grammar
    ///    too when `include_grammar` is set
    /// 3. Remote analysis overrides lemma / part of speech, prepends its
    ///    senses and overlays its grammar
    /// 4. Synonyms for the final lemma
    /// 5. Reference links for the final lemma
    /// 6. Commentary rendering, then cache store
    pub fn resolve(&self, word: &str, options: &ResolveOptions) -> ResolvedDefinition {
        let word = utils::normalize(word);
        let key = Self::cache_key(&word, options);
        if let Some(hit) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let mut def = ResolvedDefinition::new(word.as_str());

        match self.analyzer.analyze(&word) {
            Some(local) if local.is_failed() => {
                let message = local.error.unwrap_or_default();
                def.note(NoteSource::LocalAnalyzer, NoteKind::Failure, message);
            }
            Some(local) => {
                def.lemma = local.lemma;
                for sense in local.senses {
                    def.push_sense(sense);
                }
                if options.include_grammar {
                    def.part_of_speech = local.part_of_speech;
                    def.grammar = local.grammar;
                }
            }
            None => debug!(word = %word, "no local analysis"),
        }

        if options.use_remote {
            match &self.remote {
                Some(remote) => match remote.fetch(&word) {
                    Ok(candidate) => merge_remote(&mut def, candidate, options),
                    Err(failure) => {
                        def.note(NoteSource::RemoteService, NoteKind::Failure, failure.message);
                    }
                },
                None => def.note(
                    NoteSource::RemoteService,
                    NoteKind::Unavailable,
                    "no remote analyzer configured",
                ),
            }
        }

        if options.include_synonyms {
            self.attach_synonyms(&mut def);
        }

        if options.include_references {
            def.references = self.language.references(&def.lemma);
        }

        def.formatted = format::commentary(&def);
        self.cache.put(&key, &def);
        def
    }

    fn attach_synonyms(&self, def: &mut ResolvedDefinition) {
        let lookup = match (&self.synonyms, &self.synonym_availability) {
            (Some(lookup), Availability::Available) => lookup,
            (_, Availability::Unavailable(reason)) => {
                def.note(NoteSource::SynonymLookup, NoteKind::Unavailable, reason.clone());
                return;
            }
            (None, Availability::Available) => return,
        };
        match lookup.synonyms(&def.lemma) {
            Ok(found) if !found.is_empty() => def.synonyms = Some(found),
            Ok(_) => {}
            Err(e) => {
                warn!(lemma = %def.lemma, error = %e, "synonym lookup failed");
                def.note(NoteSource::SynonymLookup, NoteKind::Failure, e.to_string());
            }
        }
    }

    /// `resolve`, then attach context lemmata for multi-sense records.
    pub fn resolve_in_context(
        &self,
        word: &str,
        context: &[String],
        options: &ResolveOptions,
    ) -> ResolvedDefinition {
        let resolved = self.resolve(word, options);
        let context: Vec<String> = context.iter().map(|w| utils::normalize(w)).collect();
        self.disambiguator
            .disambiguate(&resolved.word, &context, &resolved)
    }

    /// Resolve every word, in input order.
    pub fn resolve_all<I, S>(&self, words: I, options: &ResolveOptions) -> Vec<ResolvedDefinition>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        words
            .into_iter()
            .map(|w| self.resolve(w.as_ref(), options))
            .collect()
    }

    pub fn disambiguator(&self) -> &ContextDisambiguator {
        &self.disambiguator
    }

    /// Returns (hits, misses) tuple.
    pub fn cache_stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Hit rate as a percentage (0.0 to 100.0), `None` before any lookup.
    pub fn cache_hit_rate(&self) -> Option<f32> {
        let (hits, misses) = self.cache_stats();
        let total = hits + misses;
        if total == 0 {
            None
        } else {
            Some((hits as f32 / total as f32) * 100.0)
        }
    }

    /// Final flush of the backing store.
    pub fn close(&self) -> Result<()> {
        self.cache.close()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("language", &self.language)
            .field("remote", &self.remote.is_some())
            .field("synonyms", &self.synonym_availability)
            .field("cache", &self.cache)
            .finish()
    }
}

fn merge_remote(def: &mut ResolvedDefinition, remote: AnalysisCandidate, options: &ResolveOptions) {
    if !remote.lemma.is_empty() {
        def.lemma = remote.lemma;
    }
    if !remote.part_of_speech.is_unknown() {
        def.part_of_speech = remote.part_of_speech;
    }
    def.prepend_senses(remote.senses);
    if options.include_grammar {
        def.grammar.merge_from(&remote.grammar);
    }
}
