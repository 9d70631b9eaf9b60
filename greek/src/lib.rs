//! scholia-greek
//!
//! Static Greek lexicon data for the scholia resolver.
//!
//! Two sources are supported, both loading into a `scholia_core::Lexicon`:
//! - `DccLoader` - the Dickinson core vocabulary list (CSV), with headword
//!   decomposition into lemma, gender, genitive and principal parts
//! - `LiddellLoader` - the Middle Liddell lexicon (TEI-like XML keyed by
//!   Beta code), with sense extraction and part-of-speech inference
//!
//! A missing source file always loads as an empty lexicon. Only a file that
//! exists but cannot be read is an error.
//!
//! ```no_run
//! use scholia_greek::{load_lexicon, DccLoader, LiddellLoader};
//!
//! let lexicon = load_lexicon(
//!     &DccLoader::new(),
//!     "data/dcc_greek_core.csv",
//!     &LiddellLoader::new(),
//!     "data/middle_liddell.xml",
//! )?;
//! println!("{} lookup keys", lexicon.len());
//! # Ok::<(), scholia_greek::LoadError>(())
//! ```

use scholia_core::Lexicon;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod betacode;
pub mod dcc;
pub mod heuristics;
pub mod liddell;

pub use betacode::Transliterator;
#[cfg(feature = "betacode")]
pub use betacode::BetaCode;
pub use dcc::DccLoader;
pub use liddell::LiddellLoader;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file exists but could not be opened or read.
    #[error("cannot read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is readable but not in the expected format at all (for
    /// example a CSV without a header row). Individual bad records never
    /// produce this.
    #[error("{path} is not a usable lexicon: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl LoadError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<LoadError> for scholia_core::Error {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Io { path, source } => scholia_core::Error::Io { path, source },
            LoadError::Malformed { path, message } => {
                scholia_core::Error::Parse(format!("{}: {}", path.display(), message))
            }
        }
    }
}

/// A static dictionary source.
pub trait LexiconLoader {
    /// Load `path`. A missing file gives an empty lexicon.
    fn load(&self, path: &Path) -> Result<Lexicon, LoadError>;
}

/// Load the core list, then fill in keys it lacks from the historical
/// lexicon. Core-list entries always win.
pub fn load_lexicon<P: AsRef<Path>, Q: AsRef<Path>>(
    primary: &dyn LexiconLoader,
    primary_path: P,
    secondary: &dyn LexiconLoader,
    secondary_path: Q,
) -> Result<Lexicon, LoadError> {
    let mut lexicon = primary.load(primary_path.as_ref())?;
    let extra = secondary.load(secondary_path.as_ref())?;
    let added = lexicon.merge_missing(&extra);
    info!(keys = lexicon.len(), from_secondary = added, "merged Greek lexicon");
    Ok(lexicon)
}
