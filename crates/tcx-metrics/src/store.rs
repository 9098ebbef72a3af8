//! Concurrent last-write-wins gauge store.

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

/// One label attached to a sample. Order matters for identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named gauge value with its ordered label set.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<Label>,
    pub value: f64,
}

impl Sample {
    pub fn new(name: impl Into<String>, labels: Vec<Label>, value: f64) -> Self {
        Self {
            name: name.into(),
            labels,
            value,
        }
    }

    /// Deterministic digest of (name, ordered label values).
    ///
    /// Label names are excluded on purpose: label schemas are derived from
    /// statistic names at run time, and two samples for the same series
    /// must collide even if their schemas drifted.
    pub fn identity_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        for label in &self.labels {
            hasher.update([0u8]);
            hasher.update(label.value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Shared map of identity hash → latest sample.
///
/// Cheap to clone; every writer (one per in-flight scrape) and the single
/// exposition reader hold the same underlying map. A write replaces the
/// whole entry, so the reader never observes a torn sample. There is no
/// expiry: a failed scrape leaves the previous entry stale.
#[derive(Clone, Default)]
pub struct MetricStore {
    inner: Arc<RwLock<HashMap<String, Sample>>>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the sample under its identity hash.
    pub async fn set(&self, sample: Sample) {
        let key = sample.identity_hash();
        self.inner.write().await.insert(key, sample);
    }

    /// Point-in-time copy of all current samples.
    pub async fn snapshot(&self) -> Vec<Sample> {
        self.inner.read().await.values().cloned().collect()
    }

    /// Number of live series.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
