//! Durable result cache.
//!
//! `CacheStore` is the backing store: one JSON object of string keys to
//! arbitrary JSON records, read in full on `open` and rewritten in full on
//! `flush`. A missing or corrupt file starts an empty store.
//!
//! `Cache<T>` is a typed view over a store with its own flush cadence. The
//! resolver and the remote client each hold one; they share the store but
//! count insertions independently, and keep to separate key prefixes.
//!
//! Nothing is evicted. Entries accumulate for the life of the file.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub struct CacheStore {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

impl CacheStore {
    /// Open the store at `path`. Never fails: an absent, unreadable or
    /// corrupt file leaves the store empty (the file is replaced on the next
    /// flush).
    pub fn open<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, Value>>(&bytes) {
                Ok(map) => {
                    info!(path = %path.display(), entries = map.len(), "loaded result cache");
                    map
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt cache file; starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file yet");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read cache file; starting empty");
                BTreeMap::new()
            }
        };
        Arc::new(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_raw(&self, key: &str) -> Option<Value> {
        match self.entries.lock() {
            Ok(map) => map.get(key).cloned(),
            Err(_) => None,
        }
    }

    pub fn insert_raw(&self, key: String, value: Value) {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key, value);
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole store to disk, replacing the file atomically.
    /// No-op for in-memory stores.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let map = self
            .entries
            .lock()
            .map_err(|_| Error::Parse("cache store lock poisoned".into()))?;
        let bytes = serde_json::to_vec(&*map)?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| Error::io(&dir, e))?;
        tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
        debug!(path = %path.display(), entries = map.len(), "flushed result cache");
        Ok(())
    }

    /// Final flush.
    pub fn close(&self) -> Result<()> {
        self.flush()
    }
}

/// Typed view over a `CacheStore` that flushes every `flush_every`
/// insertions.
pub struct Cache<T> {
    store: Arc<CacheStore>,
    flush_every: usize,
    inserted: AtomicUsize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("store", &self.store)
            .field("flush_every", &self.flush_every)
            .field("inserted", &self.inserted.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> Cache<T> {
    /// `flush_every` of zero is treated as one.
    pub fn new(store: Arc<CacheStore>, flush_every: usize) -> Self {
        Self {
            store,
            flush_every: flush_every.max(1),
            inserted: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Fetch and decode a record. A record that no longer decodes as `T` is
    /// treated as a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        let raw = self.store.get_raw(key)?;
        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "stale cache record ignored");
                None
            }
        }
    }

    /// Store a record, flushing the backing store on every
    /// `flush_every`-th insertion through this view. A failed flush is
    /// logged; the in-memory record stays.
    pub fn put(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "cannot encode cache record");
                return;
            }
        };
        self.store.insert_raw(key.to_string(), encoded);
        let count = self.inserted.fetch_add(1, Ordering::SeqCst) + 1;
        if count % self.flush_every == 0 {
            if let Err(e) = self.store.flush() {
                warn!(error = %e, "periodic cache flush failed");
            }
        }
    }

    pub fn insertions(&self) -> usize {
        self.inserted.load(Ordering::SeqCst)
    }

    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}
