//! Remote morphological analysis over HTTP.
//!
//! `MorpheusClient` queries a Morpheus-style service
//! (`GET {endpoint}?lang=..&engine=..&word=..`) with the `reqwest` blocking
//! client; no async runtime is involved. Every outcome, success or failure,
//! is memoized in the shared result cache under `morpheus:<lang>:<word>`.
//!
//! The service answers with a loosely shaped JSON document
//! (`RDF.Annotation.Body[].rest.entry.{dict,infl}`) where any level may be
//! missing, a single object, or a list. `parse_response` decodes it through
//! an explicit optional-field tree rather than probing a `Value`.

use crate::cache::{Cache, CacheStore};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::grammar::{Grammar, GrammarKey};
use crate::language::Language;
use crate::model::{AnalysisCandidate, Source};
use crate::pos::PartOfSpeech;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Why a remote lookup produced no analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Connection, timeout or body-read failure.
    Transport,
    /// The service answered with a status other than 200 or 201.
    Service { status: u16 },
    /// The body was not the expected JSON.
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("remote analysis of '{word}' failed: {message}")]
pub struct RemoteFailure {
    pub word: String,
    pub kind: FailureKind,
    pub message: String,
}

impl RemoteFailure {
    pub fn new<W: Into<String>, M: Into<String>>(word: W, kind: FailureKind, message: M) -> Self {
        Self {
            word: word.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind == FailureKind::Transport
    }
}

impl From<RemoteFailure> for Error {
    fn from(f: RemoteFailure) -> Self {
        match f.kind {
            FailureKind::Transport => Error::Transport(f.message),
            FailureKind::Service { status } => Error::Service {
                status,
                message: f.message,
            },
            FailureKind::Parse => Error::Parse(f.message),
        }
    }
}

/// A network analysis service.
pub trait RemoteAnalyzer: Send + Sync {
    /// Analyze `word`. Never panics on network trouble; every problem is a
    /// `RemoteFailure`.
    fn fetch(&self, word: &str) -> std::result::Result<AnalysisCandidate, RemoteFailure>;
}

type Outcome = std::result::Result<AnalysisCandidate, RemoteFailure>;

/// Blocking client for the Morpheus analysis service.
pub struct MorpheusClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    language: Language,
    max_retries: u32,
    retry_delay: Duration,
    cache: Cache<Outcome>,
    requests: AtomicUsize,
}

impl MorpheusClient {
    pub fn new(config: &RemoteConfig, language: Language, store: Arc<CacheStore>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('?').to_string(),
            language,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            cache: Cache::new(store, config.flush_every),
            requests: AtomicUsize::new(0),
        })
    }

    /// HTTP requests issued so far, retries included.
    pub fn requests_sent(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn cache_key(&self, word: &str) -> String {
        format!("morpheus:{}:{}", self.language.code(), word)
    }

    pub fn request_url(&self, word: &str) -> String {
        format!(
            "{}?lang={}&engine={}&word={}",
            self.endpoint,
            self.language.code(),
            self.language.engine(),
            urlencoding::encode(word)
        )
    }

    pub fn close(&self) -> Result<()> {
        self.cache.close()
    }

    /// One request with no retry and no cache.
    fn request(&self, word: &str) -> Outcome {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let url = self.request_url(word);
        let transport = |e: reqwest::Error| {
            let message = if e.is_timeout() {
                format!("request timed out: {}", e)
            } else {
                e.to_string()
            };
            RemoteFailure::new(word, FailureKind::Transport, message)
        };

        let response = self.client.get(&url).send().map_err(transport)?;
        let status = response.status().as_u16();
        // The service answers 201 for successful analyses.
        if status != 200 && status != 201 {
            return Err(RemoteFailure::new(
                word,
                FailureKind::Service { status },
                format!("service returned HTTP {}", status),
            ));
        }
        let body = response.text().map_err(transport)?;
        parse_response(&body, word)
            .map_err(|e| RemoteFailure::new(word, FailureKind::Parse, e.to_string()))
    }
}

impl RemoteAnalyzer for MorpheusClient {
    fn fetch(&self, word: &str) -> Outcome {
        let key = self.cache_key(word);
        if let Some(outcome) = self.cache.get(&key) {
            debug!(word, "remote analysis cache hit");
            return outcome;
        }

        let mut retries = 0;
        let outcome = loop {
            match self.request(word) {
                Err(failure) if failure.is_transport() && retries < self.max_retries => {
                    retries += 1;
                    warn!(word, attempt = retries, error = %failure.message, "retrying remote analysis");
                    std::thread::sleep(self.retry_delay);
                }
                other => break other,
            }
        };
        if let Err(failure) = &outcome {
            warn!(word, error = %failure.message, "remote analysis failed");
        }
        self.cache.put(&key, &outcome);
        outcome
    }
}

impl std::fmt::Debug for MorpheusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MorpheusClient")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

// Response tree. Every field is optional; a field of an unexpected shape is
// kept as `Malformed` and skipped instead of failing the whole document.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Field<T> {
    Present(T),
    Malformed(IgnoredAny),
}

impl<T> Field<T> {
    fn get(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Malformed(_) => None,
        }
    }
}

/// A node that is sometimes one object and sometimes a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<Field<T>>),
    One(Field<T>),
}

impl<T> OneOrMany<T> {
    fn items(&self) -> Vec<&T> {
        match self {
            OneOrMany::Many(items) => items.iter().filter_map(Field::get).collect(),
            OneOrMany::One(item) => item.get().into_iter().collect(),
        }
    }
}

/// A `{"$": value}` text node.
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$")]
    value: Option<serde_json::Value>,
}

impl Text {
    fn as_string(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn text(field: &Option<Field<Text>>) -> Option<String> {
    field.as_ref().and_then(Field::get).and_then(Text::as_string)
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(rename = "RDF")]
    rdf: Option<Field<Rdf>>,
}

#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "Annotation")]
    annotation: Option<Field<Annotation>>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    #[serde(rename = "Body")]
    body: Option<OneOrMany<Body>>,
}

#[derive(Debug, Deserialize)]
struct Body {
    rest: Option<Field<Rest>>,
}

#[derive(Debug, Deserialize)]
struct Rest {
    entry: Option<Field<Entry>>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    dict: Option<Field<DictInfo>>,
    infl: Option<OneOrMany<HashMap<String, Field<Text>>>>,
}

#[derive(Debug, Deserialize)]
struct DictInfo {
    hdwd: Option<Field<Text>>,
    pofs: Option<Field<Text>>,
    gend: Option<Field<Text>>,
    decl: Option<Field<Text>>,
}

/// Service attribute name → grammar key.
const INFLECTION_FIELDS: [(&str, GrammarKey); 9] = [
    ("mood", GrammarKey::Mood),
    ("tense", GrammarKey::Tense),
    ("voice", GrammarKey::Voice),
    ("pers", GrammarKey::Person),
    ("num", GrammarKey::Number),
    ("stemtype", GrammarKey::StemType),
    ("derivtype", GrammarKey::DerivType),
    ("case", GrammarKey::Case),
    ("gend", GrammarKey::Gender),
];

/// Decode a service response into a candidate for `word`.
///
/// Bodies are read in order and stop at the first one that leaves both a
/// part of speech and some grammar behind; later bodies are lower-ranked
/// alternates. A document with no usable body still decodes, to a candidate
/// whose lemma is `word` itself. Only a body that is not JSON is an error.
pub fn parse_response(body: &str, word: &str) -> Result<AnalysisCandidate> {
    let doc: Document = serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("malformed analysis response: {}", e)))?;

    let mut candidate = AnalysisCandidate::new(word, Source::RemoteService);
    let mut grammar = Grammar::new();

    let bodies = doc
        .rdf
        .as_ref()
        .and_then(Field::get)
        .and_then(|rdf| rdf.annotation.as_ref())
        .and_then(Field::get)
        .and_then(|a| a.body.as_ref())
        .map(OneOrMany::items)
        .unwrap_or_default();

    for body in bodies {
        let Some(entry) = body
            .rest
            .as_ref()
            .and_then(Field::get)
            .and_then(|r| r.entry.as_ref())
            .and_then(Field::get)
        else {
            continue;
        };

        if let Some(dict) = entry.dict.as_ref().and_then(Field::get) {
            if let Some(lemma) = text(&dict.hdwd) {
                candidate.lemma = lemma;
            }
            if let Some(pofs) = text(&dict.pofs) {
                candidate.part_of_speech = PartOfSpeech::from_label(&pofs);
            }
            if let Some(gender) = text(&dict.gend) {
                grammar.insert(GrammarKey::Gender, gender);
            }
            if let Some(decl) = text(&dict.decl) {
                grammar.insert(GrammarKey::Declension, decl);
            }
        }

        for infl in entry.infl.as_ref().map(OneOrMany::items).unwrap_or_default() {
            for (name, key) in INFLECTION_FIELDS {
                if let Some(value) = infl.get(name).and_then(Field::get).and_then(Text::as_string) {
                    grammar.insert(key, value);
                }
            }
        }

        if !candidate.part_of_speech.is_unknown() && !grammar.is_empty() {
            break;
        }
    }

    candidate.grammar = grammar;
    Ok(candidate)
}
