//! Error taxonomy for the scholia crates.
//!
//! Only a few of these ever cross a public boundary as `Err`: unreadable
//! source files, configuration mistakes and unknown output formats. The
//! others (transport, service, parse) are produced by collaborators and
//! folded into note fields on a resolved record. A missing collaborator is
//! not an error at all: it reports `Availability::Unavailable` and leaves
//! an "unavailable" note.

use std::path::{Path, PathBuf};

/// Result alias used across the scholia crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source file exists but could not be read (or a cache file could not
    /// be written).
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a status other than 200/201.
    #[error("service returned status {status}: {message}")]
    Service { status: u16, message: String },

    /// A body or record could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown output format '{0}' (expected latex, markdown, html or text)")]
    UnknownFormat(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
