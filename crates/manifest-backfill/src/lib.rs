//! Backfill driver: walks the archive, classifies every run against the cutoff
//! and writes skip markers for runs that predate it.
//!
//! The run is strictly sequential and aborts on the first error. Counters are
//! only handed back once every identifier has been processed.

use std::sync::Arc;

use archive_listing::{list_run_identifiers, ArchiveLocation, ListingError, RunLister};
use manifest_store::{ManifestStore, StoreError};
use run_classifier::{classify, Classification, FormatError, RunIdentifier};
use thiserror::Error;
use tracing::{debug, info};

mod clock;
mod config;

pub use clock::{Clock, SystemClock};
pub use config::{BackfillConfig, TOOL_VERSION};

/// Counters reported after a successful backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Skip records written by this run.
    pub added: usize,
    /// Runs at or after the cutoff, left for the pipeline.
    pub skipped: usize,
    /// Runs before the cutoff that the manifest already knew about.
    pub already_present: usize,
}

impl BackfillReport {
    pub fn total(&self) -> usize {
        self.added + self.skipped + self.already_present
    }
}

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to a single run identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Added,
    AlreadyPresent,
    LeftForPipeline,
}

pub struct Backfill<L: RunLister + ?Sized, S: ManifestStore + ?Sized> {
    lister: Arc<L>,
    store: Arc<S>,
    config: BackfillConfig,
    clock: Arc<dyn Clock>,
}

impl<L, S> Backfill<L, S>
where
    L: RunLister + ?Sized,
    S: ManifestStore + ?Sized,
{
    pub fn new(lister: Arc<L>, store: Arc<S>, config: BackfillConfig) -> Self {
        Self {
            lister,
            store,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reconcile the manifest against every run found at `location`.
    pub async fn run(&self, location: &ArchiveLocation) -> Result<BackfillReport, BackfillError> {
        info!(
            location = %location,
            cutoff = %self.config.cutoff,
            "starting manifest backfill"
        );
        let mut report = BackfillReport::default();
        let mut listing = list_run_identifiers(self.lister.as_ref(), location);
        while let Some(batch) = listing.next_page().await? {
            for identifier in batch {
                match self.process(&identifier).await? {
                    Outcome::Added => report.added += 1,
                    Outcome::AlreadyPresent => report.already_present += 1,
                    Outcome::LeftForPipeline => report.skipped += 1,
                }
            }
        }
        info!(
            added = report.added,
            skipped = report.skipped,
            already_present = report.already_present,
            pages = listing.pages(),
            "manifest backfill finished"
        );
        Ok(report)
    }

    async fn process(&self, identifier: &RunIdentifier) -> Result<Outcome, BackfillError> {
        match classify(identifier, &self.config.cutoff)? {
            Classification::Process => {
                debug!(run_id = %identifier, "at or after cutoff, leaving for pipeline");
                Ok(Outcome::LeftForPipeline)
            }
            Classification::Skip => {
                if self.store.contains(identifier).await? {
                    info!(run_id = %identifier, "run manifest already contains run, doing nothing");
                    return Ok(Outcome::AlreadyPresent);
                }
                let now = self.clock.now_epoch_seconds();
                self.store
                    .insert_skip_record(identifier, &self.config.tool_version, now)
                    .await?;
                info!(run_id = %identifier, added_at = now, "marked run as skipped");
                Ok(Outcome::Added)
            }
        }
    }
}
