//! Runtime configuration for the resolution pipeline.
//!
//! Every section has defaults, so a TOML file only needs the keys it wants
//! to change:
//!
//! ```rust
//! use scholia_core::{Config, Language};
//!
//! let cfg = Config::from_toml_str("language = \"greek\"\n[remote]\nmax_retries = 0\n").unwrap();
//! assert_eq!(cfg.language, Language::Greek);
//! assert_eq!(cfg.remote.max_retries, 0);
//! assert_eq!(cfg.cache.flush_every, 10);
//! ```

use crate::error::{Error, Result};
use crate::language::Language;
use crate::resolver::ResolveOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
    pub analyzer: AnalyzerConfig,
    /// Options used when the caller does not pass its own.
    pub defaults: ResolveOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL; `lang`, `engine` and `word` are appended as query parameters.
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Retries after a transport failure. Service errors are never retried.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Flush the shared cache every N remote lookups.
    pub flush_every: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://morph.perseids.org/analysis/word".to_string(),
            timeout_ms: 10_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
            flush_every: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache file; `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    /// Flush every N resolved records.
    pub flush_every: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            flush_every: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Entries kept in the local analyzer's LRU memo.
    pub memo_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            memo_capacity: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.remote.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("remote.endpoint is empty".into()));
        }
        if self.remote.flush_every == 0 {
            return Err(Error::InvalidConfig("remote.flush_every must be at least 1".into()));
        }
        if self.cache.flush_every == 0 {
            return Err(Error::InvalidConfig("cache.flush_every must be at least 1".into()));
        }
        if self.analyzer.memo_capacity == 0 {
            return Err(Error::InvalidConfig(
                "analyzer.memo_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
