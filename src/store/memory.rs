//! In-memory counter store for tests, fixtures, and JSON snapshot files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::errors::{EngineError, Result};
use crate::store::{CounterStore, pattern_matches};

/// Deterministic in-memory store over a sorted key map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace one entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a store from a JSON snapshot: one object mapping keys to string
    /// or numeric values. Numeric values are stored in their decimal string
    /// form, matching what the population job writes.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut entries = BTreeMap::new();
        for (key, value) in parsed {
            let rendered = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(EngineError::Serialization {
                        context: "snapshot",
                        details: format!("key {key:?} holds non-scalar value {other}"),
                    });
                }
            };
            entries.insert(key, rendered);
        }
        Ok(Self { entries })
    }

    /// Build a store from a JSON snapshot file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| EngineError::io(path, source))?;
        Self::from_json_str(&raw)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl CounterStore for MemoryStore {
    fn get_all_by_pattern(&self, pattern: &str) -> Result<BTreeMap<String, String>> {
        Ok(self
            .entries
            .iter()
            .filter(|(key, _)| pattern_matches(pattern, key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }
}
