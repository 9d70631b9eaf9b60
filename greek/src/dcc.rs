//! Dickinson core vocabulary loader.
//!
//! The list is a CSV with one row per headword. Columns used:
//! `Headword`, `Part of Speech`, `DEFINITION`, `SEMANTIC GROUP` and
//! `FREQUENCY RANK`. Extra columns are ignored; missing ones read as empty.
//!
//! Headwords carry more than the lemma. Verbs list their principal parts
//! ("λέγω, ἐρῶ, εἶπον, εἴρηκα, λέλεγμαι, ἐλέχθην"), adjectives and pronouns
//! list their three genders ("αὐτός αὐτή αὐτό") or dash endings
//! ("ὄγδοος –η –ον"), and nouns may add a genitive ending ("λόγος -ου").
//! The extra forms become aliases of the entry.

use crate::heuristics::{
    extract_declension, gender_from_genitive, gender_from_nominative, is_dash_marker,
    is_greek_word, looks_masculine,
};
use crate::{LexiconLoader, LoadError};
use scholia_core::{Gender, Lexicon, LexiconEntry, PartOfSpeech, PrincipalParts};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

const HEADWORD_COLUMN: &str = "Headword";

#[derive(Debug, Deserialize)]
struct DccRow {
    #[serde(rename = "Headword", default)]
    headword: String,
    #[serde(rename = "Part of Speech", default)]
    part_of_speech: String,
    #[serde(rename = "DEFINITION", default)]
    definition: String,
    #[serde(rename = "SEMANTIC GROUP", default)]
    semantic_group: String,
    #[serde(rename = "FREQUENCY RANK", default)]
    frequency_rank: String,
}

/// What a headword cell decomposes into.
#[derive(Debug, Default, PartialEq)]
struct Headword {
    lemma: String,
    gender: Option<Gender>,
    genitive: Option<String>,
    principal_parts: PrincipalParts,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DccLoader;

impl DccLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse CSV text from any reader. `origin` only labels errors.
    pub fn from_reader<R: Read>(&self, reader: R, origin: &Path) -> Result<Lexicon, LoadError> {
        let mut table = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = table.headers().map_err(|e| csv_error(origin, e))?.clone();
        if !headers.iter().any(|h| h == HEADWORD_COLUMN) {
            return Err(LoadError::Malformed {
                path: origin.to_path_buf(),
                message: format!("no {:?} column in header", HEADWORD_COLUMN),
            });
        }

        let mut lexicon = Lexicon::new();
        let mut rows = 0usize;
        for (idx, record) in table.deserialize::<DccRow>().enumerate() {
            let row = match record {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(csv_error(origin, e)),
                Err(e) => {
                    debug!(row = idx + 1, error = %e, "skipping unreadable row");
                    continue;
                }
            };
            if add_row(&mut lexicon, row) {
                rows += 1;
            }
        }

        info!(path = %origin.display(), rows, keys = lexicon.len(), "loaded core vocabulary");
        Ok(lexicon)
    }
}

impl LexiconLoader for DccLoader {
    fn load(&self, path: &Path) -> Result<Lexicon, LoadError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "core vocabulary not found, using empty lexicon");
                return Ok(Lexicon::new());
            }
            Err(e) => return Err(LoadError::io(path, e)),
        };
        self.from_reader(io::BufReader::new(file), path)
    }
}

fn csv_error(path: &Path, e: csv::Error) -> LoadError {
    match e.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::io(path, source),
        other => LoadError::Malformed {
            path: path.to_path_buf(),
            message: format!("{:?}", other),
        },
    }
}

/// Returns whether the row produced an entry.
fn add_row(lexicon: &mut Lexicon, row: DccRow) -> bool {
    let headword: String = row.headword.nfc().collect();
    let definition = row.definition.trim();
    if headword.trim().is_empty() || definition.is_empty() {
        return false;
    }

    let label = row.part_of_speech.as_str();
    let pos = PartOfSpeech::classify_label(label).unwrap_or_default();
    let parsed = parse_headword(&headword, pos);
    if parsed.lemma.is_empty() {
        return false;
    }

    let mut entry = LexiconEntry::new(parsed.lemma.clone(), pos);
    entry.gender = parsed.gender;
    entry.genitive = parsed.genitive;
    entry.principal_parts = parsed.principal_parts;
    entry.declension = extract_declension(label).filter(|d| *d > 0);
    entry.senses = vec![definition.to_string()];
    entry.frequency_rank = row.frequency_rank.parse().ok();
    entry.semantic_group = Some(row.semantic_group).filter(|g| !g.is_empty());

    let shared = lexicon.insert(entry);
    for alias in alternate_forms(&headword, &parsed.lemma) {
        lexicon.insert_alias(alias, &shared);
    }
    true
}

fn parse_headword(headword: &str, pos: PartOfSpeech) -> Headword {
    match pos {
        PartOfSpeech::Verb => parse_verb(headword),
        PartOfSpeech::Adjective => {
            let forms: Vec<&str> = headword.split_whitespace().collect();
            let lemma = forms.first().copied().unwrap_or_default();
            let gender = if forms.len() == 3 || looks_masculine(lemma) {
                Some(Gender::Masculine)
            } else {
                None
            };
            Headword {
                lemma: lemma.to_string(),
                gender,
                ..Headword::default()
            }
        }
        PartOfSpeech::Pronoun | PartOfSpeech::Article => {
            let forms: Vec<&str> = headword.split_whitespace().collect();
            Headword {
                lemma: forms.first().copied().unwrap_or_default().to_string(),
                gender: (forms.len() == 3).then_some(Gender::Masculine),
                ..Headword::default()
            }
        }
        _ => parse_noun(headword, pos == PartOfSpeech::Noun),
    }
}

fn parse_verb(headword: &str) -> Headword {
    let forms: Vec<&str> = headword.split(',').map(str::trim).collect();
    let mut parsed = Headword {
        lemma: forms.first().copied().unwrap_or_default().to_string(),
        ..Headword::default()
    };
    if forms.len() > 1 {
        for (i, form) in forms.iter().take(PrincipalParts::SLOTS).enumerate() {
            if form.is_empty() || form.starts_with("impf") || form.starts_with("infin") {
                continue;
            }
            let form = form.split(" and ").next().unwrap_or(form).trim();
            if let Some(slot) = parsed.principal_parts.slot_mut(i) {
                *slot = Some(form.to_string());
            }
        }
    }
    parsed
}

fn parse_noun(headword: &str, is_noun: bool) -> Headword {
    let mut tokens = headword.split_whitespace();
    let lemma = tokens.next().unwrap_or(headword.trim()).to_string();
    let genitive = tokens
        .find(|t| is_dash_marker(t))
        .map(|t| t.replace('–', "-"));
    let gender = match &genitive {
        Some(g) => gender_from_genitive(g),
        None if is_noun => gender_from_nominative(&lemma),
        None => None,
    };
    Headword {
        lemma,
        gender,
        genitive,
        ..Headword::default()
    }
}

/// Whole Greek words after the first token, for extra lookup keys.
fn alternate_forms<'a>(headword: &'a str, lemma: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    headword
        .split_whitespace()
        .skip(1)
        .map(|t| t.trim_matches(','))
        .filter(move |t| !is_dash_marker(t) && *t != lemma && is_greek_word(t))
}
