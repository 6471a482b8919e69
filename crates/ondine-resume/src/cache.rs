//! In-memory resume data cache snapshots.
//!
//! The cache remembers asynchronous values produced during a render so
//! a resumed render can reuse them instead of recomputing. Entries are
//! either already-materialized text or a stream still being produced;
//! streamed entries are fully drained before the snapshot can be
//! embedded in an encoded state string.

use facet::Facet;
use futures::stream::{BoxStream, StreamExt};
use indexmap::IndexMap;

use crate::{Error, Result};

/// One cached value.
pub enum CacheEntry {
    /// A fully materialized cached value.
    Text(String),
    /// A cached value still being produced by the renderer. Drained to
    /// text by [`ResumeDataCache::materialize`].
    Streamed(BoxStream<'static, String>),
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Streamed(_) => f.debug_tuple("Streamed").field(&"..").finish(),
        }
    }
}

/// Serialized form of one cache entry: key plus materialized text.
///
/// A sequence of records (rather than a map) keeps the serialized blob
/// byte-for-byte stable in entry insertion order.
#[derive(Debug, Clone, Facet)]
struct CacheRecord {
    key: String,
    value: String,
}

/// A snapshot of cached asynchronous values, keyed by identifier.
///
/// Insertion order is preserved; serializing the same snapshot twice
/// yields identical bytes.
#[derive(Debug, Default)]
pub struct ResumeDataCache {
    entries: IndexMap<String, CacheEntry>,
}

impl ResumeDataCache {
    /// Create an empty snapshot.
    ///
    /// This is also the value a corrupted state string degrades to:
    /// resuming with an empty cache recomputes everything, which is
    /// slower but never wrong.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a materialized value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), CacheEntry::Text(value.into()));
    }

    /// Store a value that is still streaming in.
    pub fn set_streamed(&mut self, key: impl Into<String>, stream: BoxStream<'static, String>) {
        self.entries.insert(key.into(), CacheEntry::Streamed(stream));
    }

    /// Read a materialized value.
    ///
    /// Streamed entries read as `None` until [`Self::materialize`] (or
    /// [`Self::serialize`]) has drained them.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            CacheEntry::Text(text) => Some(text),
            CacheEntry::Streamed(_) => None,
        }
    }

    /// Iterate over entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Drain every streamed entry into text, in place.
    pub async fn materialize(&mut self) {
        for entry in self.entries.values_mut() {
            if let CacheEntry::Streamed(stream) = entry {
                let mut text = String::new();
                while let Some(chunk) = stream.next().await {
                    text.push_str(&chunk);
                }
                *entry = CacheEntry::Text(text);
            }
        }
    }

    /// Materialize all entries and emit the snapshot as one JSON blob.
    ///
    /// This is the single suspension point of the state encode path.
    pub async fn serialize(&mut self) -> String {
        self.materialize().await;
        let records: Vec<CacheRecord> = self
            .entries
            .iter()
            .map(|(key, entry)| CacheRecord {
                key: key.clone(),
                value: match entry {
                    CacheEntry::Text(text) => text.clone(),
                    // materialize() left no streamed entries behind
                    CacheEntry::Streamed(_) => String::new(),
                },
            })
            .collect();
        facet_json::to_string(&records)
    }

    /// Reconstruct a snapshot from a blob produced by [`Self::serialize`].
    pub fn from_serialized(serialized: &str) -> Result<Self> {
        let records: Vec<CacheRecord> = facet_json::from_str(serialized)
            .map_err(|e| Error::Cache(format!("cache snapshot parse error: {e}")))?;
        let mut cache = Self::empty();
        for record in records {
            cache.set(record.key, record.value);
        }
        Ok(cache)
    }
}
