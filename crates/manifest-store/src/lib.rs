//! Run manifest table client.
//!
//! The manifest is owned by the downstream pipeline; this crate only looks up
//! run ids and writes skip markers for them.

use async_trait::async_trait;
use run_classifier::RunIdentifier;
use serde::{Deserialize, Serialize};

mod dynamo;
mod error;
mod memory;

pub use dynamo::DynamoManifestStore;
pub use error::StoreError;
pub use memory::InMemoryManifestStore;

/// Partition key of the manifest table.
pub const RUN_ID_ATTRIBUTE: &str = "RunId";
pub const ADDED_BY_ATTRIBUTE: &str = "AddedBy";
pub const ADDED_AT_ATTRIBUTE: &str = "AddedAt";
pub const TO_SKIP_ATTRIBUTE: &str = "ToSkip";

/// One row of the manifest table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestRecord {
    pub run_id: RunIdentifier,
    pub added_by: String,
    pub added_at: i64,
    pub to_skip: bool,
}

impl ManifestRecord {
    /// Skip marker for a run that the pipeline must not process again.
    pub fn skip(run_id: RunIdentifier, tool_version: impl Into<String>, added_at: i64) -> Self {
        Self {
            run_id,
            added_by: tool_version.into(),
            added_at,
            to_skip: true,
        }
    }
}

/// Point lookups and skip-marker writes against the manifest table.
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Whether a record keyed by `identifier` already exists.
    async fn contains(&self, identifier: &RunIdentifier) -> Result<bool, StoreError>;

    /// Unconditionally write a skip record for `identifier`.
    ///
    /// This is a plain overwrite: a second call replaces the record and its
    /// `AddedAt`, it does not fail because the key exists.
    async fn insert_skip_record(
        &self,
        identifier: &RunIdentifier,
        tool_version: &str,
        now_epoch_seconds: i64,
    ) -> Result<(), StoreError>;
}
