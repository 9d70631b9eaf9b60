// core/tests/resolver_pipeline.rs
//
// End-to-end tests for the definition resolver with mock collaborators.
//
// Tests cover:
// - Local-only resolution (remote disabled)
// - Remote merge precedence: lemma/pos override, sense prepend, grammar overlay
// - Cache idempotence and per-option keying
// - Failure and unavailability notes
// - Persistence of resolved records across resolver instances

use scholia_core::{
    Analysis, AnalysisCandidate, Availability, CacheStore, CollaboratorError, FailureKind,
    GrammarKey, LemmaLookup, LemmaMatch, MorphParser, NoteKind, NoteSource, Parse, PartOfSpeech,
    RemoteAnalyzer, RemoteFailure, ResolveOptions, Resolver, Source, SynonymLookup,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Whitaker-style parser that knows a handful of forms.
struct MockParser {
    calls: Arc<AtomicUsize>,
}

impl MockParser {
    fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MorphParser for MockParser {
    fn parse(&self, word: &str) -> Result<Vec<Parse>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let analysis = match word {
            "amo" => Analysis {
                lemma: None,
                part_of_speech: Some("V".into()),
                senses: vec!["love".into(), "like".into()],
                features: vec![
                    ("tense".into(), "pres".into()),
                    ("mood".into(), "ind".into()),
                    ("voice".into(), "active".into()),
                ],
            },
            "puellae" => Analysis {
                lemma: Some("puella".into()),
                part_of_speech: Some("N".into()),
                senses: vec!["girl".into()],
                features: vec![
                    ("declension".into(), "1".into()),
                    ("gender".into(), "F".into()),
                    ("case".into(), "gen".into()),
                ],
            },
            "boom" => return Err("analyzer exploded".into()),
            _ => return Ok(Vec::new()),
        };
        Ok(vec![Parse {
            analyses: vec![analysis],
        }])
    }
}

/// Remote analyzer returning a fixed answer and counting calls.
#[derive(Clone)]
struct MockRemote {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockRemote {
    fn new(fail: bool) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail,
        }
    }
}

impl RemoteAnalyzer for MockRemote {
    fn fetch(&self, word: &str) -> Result<AnalysisCandidate, RemoteFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RemoteFailure::new(
                word,
                FailureKind::Service { status: 503 },
                "service returned HTTP 503",
            ));
        }
        let mut c = AnalysisCandidate::new("amo", Source::RemoteService);
        c.part_of_speech = PartOfSpeech::Verb;
        c.senses = vec!["to love".into()];
        c.grammar.insert(GrammarKey::Mood, "indicative");
        c.grammar.insert(GrammarKey::Person, "1st");
        Ok(c)
    }
}

struct MockSynonyms;

impl SynonymLookup for MockSynonyms {
    fn synonyms(&self, lemma: &str) -> Result<Vec<String>, CollaboratorError> {
        match lemma {
            "amo" => Ok(vec!["diligo".into(), "caritas".into()]),
            "puella" => Err("synonym index corrupt".into()),
            _ => Ok(Vec::new()),
        }
    }
}

struct OfflineSynonyms;

impl SynonymLookup for OfflineSynonyms {
    fn availability(&self) -> Availability {
        Availability::Unavailable("semantic package not installed".into())
    }

    fn synonyms(&self, _: &str) -> Result<Vec<String>, CollaboratorError> {
        panic!("unavailable collaborator must not be called");
    }
}

struct Neighbourhood;

impl LemmaLookup for Neighbourhood {
    fn lookup(&self, forms: &[String]) -> Result<Vec<LemmaMatch>, CollaboratorError> {
        Ok(forms
            .iter()
            .map(|f| LemmaMatch {
                form: f.clone(),
                lemmas: vec![f.trim_end_matches('m').to_string()],
            })
            .collect())
    }
}

#[test]
fn scenario_local_only_verb() {
    let resolver = Resolver::builder(MockParser::new()).build();
    let def = resolver.resolve("amo", &ResolveOptions::offline());

    assert_eq!(def.part_of_speech, PartOfSpeech::Verb);
    assert_eq!(def.part_of_speech.as_str(), "verb");
    assert_eq!(def.senses, vec!["love", "like"]);
    assert_eq!(def.lemma, "amo");
    assert!(def.notes_from(NoteSource::RemoteService).next().is_none());
}

#[test]
fn scenario_remote_prepends_and_is_cached() {
    let remote = MockRemote::new(false);
    let resolver = Resolver::builder(MockParser::new())
        .remote(remote.clone())
        .build();
    let options = ResolveOptions::default();

    let first = resolver.resolve("amo", &options);
    let second = resolver.resolve("amo", &options);

    assert_eq!(first.senses[0], "to love");
    assert_eq!(first.senses, vec!["to love", "love", "like"]);
    assert_eq!(first, second);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cache_stats(), (1, 1));
    assert_eq!(resolver.cache_hit_rate(), Some(50.0));
}

#[test]
fn remote_overlays_grammar_and_keeps_local_keys() {
    let resolver = Resolver::builder(MockParser::new())
        .remote(MockRemote::new(false))
        .build();
    let def = resolver.resolve("amo", &ResolveOptions::default());

    assert_eq!(def.grammar.get(GrammarKey::Mood), Some("indicative"));
    assert_eq!(def.grammar.get(GrammarKey::Tense), Some("pres"));
    assert_eq!(def.grammar.get(GrammarKey::Person), Some("1st"));
    // local insertion order first, remote-only keys after
    let keys: Vec<_> = def.grammar.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            GrammarKey::Tense,
            GrammarKey::Mood,
            GrammarKey::Voice,
            GrammarKey::Person
        ]
    );
}

#[test]
fn remote_lemma_overrides_local() {
    let resolver = Resolver::builder(MockParser::new())
        .remote(MockRemote::new(false))
        .build();
    let def = resolver.resolve("amavi", &ResolveOptions::default());
    assert_eq!(def.word, "amavi");
    assert_eq!(def.lemma, "amo");
    assert_eq!(def.senses, vec!["to love"]);
}

#[test]
fn remote_pos_applies_without_grammar() {
    let resolver = Resolver::builder(MockParser::new())
        .remote(MockRemote::new(false))
        .build();
    let options = ResolveOptions {
        include_grammar: false,
        ..ResolveOptions::default()
    };

    let def = resolver.resolve("amavi", &options);
    assert_eq!(def.lemma, "amo");
    assert_eq!(def.part_of_speech, PartOfSpeech::Verb);
    assert!(def.grammar.is_empty());

    let def = resolver.resolve("amo", &options);
    assert_eq!(def.part_of_speech, PartOfSpeech::Verb);
    assert_eq!(def.senses, vec!["to love", "love", "like"]);
    assert!(def.grammar.is_empty());
}

#[test]
fn remote_failure_is_a_note_not_an_error() {
    let resolver = Resolver::builder(MockParser::new())
        .remote(MockRemote::new(true))
        .build();
    let def = resolver.resolve("amo", &ResolveOptions::default());

    assert_eq!(def.senses, vec!["love", "like"]);
    let notes: Vec<_> = def.notes_from(NoteSource::RemoteService).collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NoteKind::Failure);
    assert!(notes[0].message.contains("503"));
}

#[test]
fn remote_requested_but_not_configured() {
    let resolver = Resolver::builder(MockParser::new()).build();
    let def = resolver.resolve("amo", &ResolveOptions::default());
    let note = def.notes_from(NoteSource::RemoteService).next().unwrap();
    assert_eq!(note.kind, NoteKind::Unavailable);
}

#[test]
fn option_sets_do_not_collide() {
    let remote = MockRemote::new(false);
    let resolver = Resolver::builder(MockParser::new())
        .remote(remote.clone())
        .build();

    let offline = resolver.resolve("amo", &ResolveOptions::offline());
    let online = resolver.resolve("amo", &ResolveOptions::default());

    assert!(offline.grammar.get(GrammarKey::Person).is_none());
    assert_eq!(online.grammar.get(GrammarKey::Person), Some("1st"));
    assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cache_stats(), (0, 2));
}

#[test]
fn grammar_excluded_leaves_pos_and_grammar_empty() {
    let resolver = Resolver::builder(MockParser::new()).build();
    let options = ResolveOptions {
        use_remote: false,
        include_grammar: false,
        ..ResolveOptions::default()
    };
    let def = resolver.resolve("puellae", &options);
    assert_eq!(def.lemma, "puella");
    assert!(def.part_of_speech.is_unknown());
    assert!(def.grammar.is_empty());
    assert_eq!(def.formatted, "**puella**: girl");
}

#[test]
fn local_failure_is_recorded() {
    let resolver = Resolver::builder(MockParser::new()).build();
    let def = resolver.resolve("boom", &ResolveOptions::offline());
    assert_eq!(def.lemma, "boom");
    assert!(def.senses.is_empty());
    let note = def.notes_from(NoteSource::LocalAnalyzer).next().unwrap();
    assert_eq!(note.message, "analyzer exploded");
}

#[test]
fn synonyms_attach_and_fail_softly() {
    let resolver = Resolver::builder(MockParser::new())
        .synonyms(MockSynonyms)
        .build();
    let options = ResolveOptions::offline();

    let amo = resolver.resolve("amo", &options);
    assert_eq!(amo.synonyms.as_deref(), Some(&["diligo".to_string(), "caritas".to_string()][..]));
    assert!(amo.formatted.ends_with("\n  Synonyms: diligo, caritas"));

    let puella = resolver.resolve("puellae", &options);
    assert!(puella.synonyms.is_none());
    let note = puella.notes_from(NoteSource::SynonymLookup).next().unwrap();
    assert_eq!(note.kind, NoteKind::Failure);
}

#[test]
fn unavailable_synonyms_are_never_called() {
    let resolver = Resolver::builder(MockParser::new())
        .synonyms(OfflineSynonyms)
        .build();
    let def = resolver.resolve("amo", &ResolveOptions::offline());
    let note = def.notes_from(NoteSource::SynonymLookup).next().unwrap();
    assert_eq!(note.kind, NoteKind::Unavailable);
    assert_eq!(note.message, "semantic package not installed");
}

#[test]
fn references_follow_final_lemma() {
    let resolver = Resolver::builder(MockParser::new()).build();
    let def = resolver.resolve("puellae", &ResolveOptions::offline());
    assert_eq!(def.references.len(), 2);
    assert!(def.references.iter().all(|r| r.url.ends_with("entry=puella")));

    let without = ResolveOptions {
        include_references: false,
        ..ResolveOptions::offline()
    };
    assert!(resolver.resolve("puellae", &without).references.is_empty());
}

#[test]
fn senses_never_contain_exact_duplicates() {
    let resolver = Resolver::builder(MockParser::new())
        .remote(MockRemote::new(false))
        .build();
    for word in ["amo", "puellae", "amavi", "nihil", "boom"] {
        for options in [ResolveOptions::default(), ResolveOptions::offline()] {
            let def = resolver.resolve(word, &options);
            let unique: HashSet<_> = def.senses.iter().collect();
            assert_eq!(unique.len(), def.senses.len(), "duplicate sense for {}", word);
        }
    }
}

#[test]
fn surface_forms_are_normalized_before_keying() {
    let parser = MockParser::new();
    let calls = parser.calls.clone();
    let resolver = Resolver::builder(parser).build();
    let options = ResolveOptions::offline();
    resolver.resolve("  amo ", &options);
    resolver.resolve("amo", &options);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cache_stats(), (1, 1));
}

#[test]
fn resolve_all_keeps_input_order() {
    let remote = MockRemote::new(false);
    let resolver = Resolver::builder(MockParser::new())
        .remote(remote.clone())
        .build();
    let defs = resolver.resolve_all(["puellae", "amo", "puellae"], &ResolveOptions::default());
    let words: Vec<_> = defs.iter().map(|d| d.word.as_str()).collect();
    assert_eq!(words, vec!["puellae", "amo", "puellae"]);
    assert_eq!(defs[0], defs[2]);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn contextual_resolution_attaches_lemmata() {
    let resolver = Resolver::builder(MockParser::new())
        .lemma_lookup(Neighbourhood)
        .build();
    let context = vec!["puellam".to_string(), "bonam".to_string()];
    let def = resolver.resolve_in_context("amo", &context, &ResolveOptions::offline());

    let ctx = def.context.expect("multi-sense word gets context");
    assert!(ctx.analyzed);
    assert_eq!(ctx.lemmas.len(), 3);
    assert_eq!(ctx.lemmas[1].lemmas, vec!["puella"]);
    // senses are not reordered
    assert_eq!(def.senses, vec!["love", "like"]);
}

#[test]
fn contextual_resolution_single_sense_is_plain_resolve() {
    let resolver = Resolver::builder(MockParser::new())
        .lemma_lookup(Neighbourhood)
        .build();
    let options = ResolveOptions::offline();
    let plain = resolver.resolve("puellae", &options);
    let ctx = resolver.resolve_in_context("puellae", &["amo".to_string()], &options);
    assert_eq!(plain, ctx);
}

#[test]
fn records_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("definitions.json");
    let options = ResolveOptions::default();

    let first = {
        let remote = MockRemote::new(false);
        let resolver = Resolver::builder(MockParser::new())
            .remote(remote)
            .cache_store(CacheStore::open(&path))
            .build();
        let def = resolver.resolve("amo", &options);
        resolver.close().unwrap();
        def
    };

    let remote = MockRemote::new(false);
    let parser = MockParser::new();
    let parser_calls = parser.calls.clone();
    let resolver = Resolver::builder(parser)
        .remote(remote.clone())
        .cache_store(CacheStore::open(&path))
        .build();
    let again = resolver.resolve("amo", &options);

    assert_eq!(first, again);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    assert_eq!(parser_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn resolver_flushes_every_ten_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("definitions.json");
    let store = CacheStore::open(&path);
    let resolver = Resolver::builder(MockParser::new())
        .cache_store(store)
        .build();
    let options = ResolveOptions::offline();

    for i in 0..9 {
        resolver.resolve(&format!("w{}", i), &options);
    }
    assert!(!path.exists());
    resolver.resolve("w9", &options);
    assert!(path.exists());
}
