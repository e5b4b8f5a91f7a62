//! Enumeration of archived run identifiers.
//!
//! Backends expose one page of run folders at a time; [`RunListing`] walks
//! the continuation tokens so callers can consume identifiers lazily.

use async_trait::async_trait;
use run_classifier::RunIdentifier;
use tracing::debug;

mod error;
mod location;
mod memory;
mod s3;

pub use error::ListingError;
pub use location::ArchiveLocation;
pub use memory::InMemoryRunLister;
pub use s3::S3RunLister;

/// One page of run identifiers plus the token needed to fetch the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub identifiers: Vec<RunIdentifier>,
    /// `None` once the listing is complete.
    pub continuation: Option<String>,
}

/// Object-store backend able to list run folders under an archive.
#[async_trait]
pub trait RunLister: Send + Sync {
    /// Fetch the page starting at `continuation`, or the first page if `None`.
    async fn list_page(
        &self,
        location: &ArchiveLocation,
        continuation: Option<String>,
    ) -> Result<ListingPage, ListingError>;
}

#[derive(Debug)]
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazy cursor over every run identifier below an archive location.
///
/// Holds no state in the backend: a fresh cursor restarts from the first page.
pub struct RunListing<'a, L: RunLister + ?Sized> {
    lister: &'a L,
    location: &'a ArchiveLocation,
    cursor: Cursor,
    pages: usize,
}

impl<'a, L> RunListing<'a, L>
where
    L: RunLister + ?Sized,
{
    pub fn new(lister: &'a L, location: &'a ArchiveLocation) -> Self {
        Self {
            lister,
            location,
            cursor: Cursor::Start,
            pages: 0,
        }
    }

    /// Next batch of identifiers in storage order, or `None` when exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<RunIdentifier>>, ListingError> {
        let continuation = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
        };
        let page = self.lister.list_page(self.location, continuation).await?;
        self.pages += 1;
        debug!(
            location = %self.location,
            page = self.pages,
            identifiers = page.identifiers.len(),
            more = page.continuation.is_some(),
            "listed archive page"
        );
        if let Some(token) = page.continuation {
            self.cursor = Cursor::Next(token);
        }
        Ok(Some(page.identifiers))
    }

    /// Drain the remaining pages into one vector.
    pub async fn collect_all(mut self) -> Result<Vec<RunIdentifier>, ListingError> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_page().await? {
            all.extend(batch);
        }
        Ok(all)
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }
}

/// Start a listing of the run identifiers found at `location`.
pub fn list_run_identifiers<'a, L>(lister: &'a L, location: &'a ArchiveLocation) -> RunListing<'a, L>
where
    L: RunLister + ?Sized,
{
    RunListing::new(lister, location)
}
