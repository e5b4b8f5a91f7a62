use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use run_classifier::RunIdentifier;

use crate::{ManifestRecord, ManifestStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<RunIdentifier, ManifestRecord>,
    puts: Vec<ManifestRecord>,
    lookups: usize,
    fail_puts: Option<String>,
}

/// Manifest table held in memory. Every put is also logged so tests can
/// assert on the exact calls made.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManifestStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table with existing records.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ManifestRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| (record.run_id.clone(), record))
            .collect();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records,
                ..Inner::default()
            })),
        }
    }

    /// Make every subsequent put fail with an access error.
    pub fn fail_puts(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.fail_puts = Some(message.into());
        }
    }

    pub fn record(&self, identifier: &RunIdentifier) -> Option<ManifestRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|guard| guard.records.get(identifier).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|guard| guard.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record passed to `insert_skip_record`, in call order.
    pub fn puts(&self) -> Vec<ManifestRecord> {
        self.inner
            .lock()
            .map(|guard| guard.puts.clone())
            .unwrap_or_default()
    }

    pub fn lookups(&self) -> usize {
        self.inner.lock().map(|guard| guard.lookups).unwrap_or(0)
    }
}

#[async_trait]
impl ManifestStore for InMemoryManifestStore {
    async fn contains(&self, identifier: &RunIdentifier) -> Result<bool, StoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        guard.lookups += 1;
        Ok(guard.records.contains_key(identifier))
    }

    async fn insert_skip_record(
        &self,
        identifier: &RunIdentifier,
        tool_version: &str,
        now_epoch_seconds: i64,
    ) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        if let Some(message) = &guard.fail_puts {
            return Err(StoreError::Access(message.clone()));
        }
        let record = ManifestRecord::skip(identifier.clone(), tool_version, now_epoch_seconds);
        guard.puts.push(record.clone());
        guard.records.insert(identifier.clone(), record);
        Ok(())
    }
}
