//! scholia-core
//!
//! Lexical resolution shared by the scholia commentary tools: given a Latin
//! or Greek surface form, combine a local morphological analyzer, a remote
//! analysis service and static lexicon data into one cached
//! `ResolvedDefinition`.
//!
//! Public API:
//! - `Resolver` / `ResolveOptions` - the merging pipeline and its flags
//! - `LocalAnalyzer` / `MorphParser` - adapter over a rule-based parser
//! - `MorpheusClient` / `RemoteAnalyzer` - blocking HTTP analysis client
//! - `Lexicon` - static dictionary data (filled by the language crates)
//! - `ContextDisambiguator` - context lemmata for multi-sense records
//! - `CacheStore` / `Cache` - durable JSON result cache
//! - `format` - commentary and markup rendering
//! - `Config` - TOML configuration
//!
//! ```rust
//! use scholia_core::{Lexicon, LexiconEntry, PartOfSpeech, ResolveOptions, Resolver};
//!
//! let mut lexicon = Lexicon::new();
//! let mut entry = LexiconEntry::new("amo", PartOfSpeech::Verb);
//! entry.senses = vec!["to love".into()];
//! lexicon.insert(entry);
//!
//! let resolver = Resolver::builder(lexicon).build();
//! let def = resolver.resolve("amo", &ResolveOptions::offline());
//! assert_eq!(def.senses, vec!["to love"]);
//! ```

pub mod analyzer;
pub mod cache;
pub mod collab;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod grammar;
pub mod language;
pub mod lexicon;
pub mod model;
pub mod pos;
pub mod remote;
pub mod resolver;

pub use analyzer::{Analysis, LocalAnalyzer, MorphParser, Parse};
pub use cache::{Cache, CacheStore};
pub use collab::{
    Availability, CollaboratorError, LemmaLookup, LemmaMatch, SynonymLookup, SynonymTable,
};
pub use config::{AnalyzerConfig, CacheConfig, Config, RemoteConfig};
pub use context::ContextDisambiguator;
pub use error::{Error, Result};
pub use format::OutputFormat;
pub use grammar::{Grammar, GrammarKey};
pub use language::{Language, ReferenceTemplate};
pub use lexicon::{Gender, Lexicon, LexiconEntry, PrincipalParts};
pub use model::{
    AnalysisCandidate, ContextAnalysis, Note, NoteKind, NoteSource, Reference, ResolvedDefinition,
    Source,
};
pub use pos::PartOfSpeech;
pub use remote::{FailureKind, MorpheusClient, RemoteAnalyzer, RemoteFailure};
pub use resolver::{ResolveOptions, Resolver, ResolverBuilder};

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Strip leading and trailing punctuation a tokenizer may leave on a
    /// word ("amo," → "amo").
    pub fn strip_punctuation(s: &str) -> &str {
        s.trim_matches(|c: char| c.is_ascii_punctuation() || c == '·' || c == ';')
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn normalize_composes_and_trims() {
            // alpha + combining acute → precomposed ά
            assert_eq!(normalize(" \u{03b1}\u{0301} "), "\u{03ac}");
        }

        #[test]
        fn strip_punctuation_keeps_inner_marks() {
            assert_eq!(strip_punctuation("\"amo,\""), "amo");
            assert_eq!(strip_punctuation("λόγος·"), "λόγος");
            assert_eq!(strip_punctuation("re-cipio"), "re-cipio");
        }
    }
}
