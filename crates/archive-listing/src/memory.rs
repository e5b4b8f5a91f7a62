use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use run_classifier::RunIdentifier;

use crate::{ArchiveLocation, ListingError, ListingPage, RunLister};

/// Fixed listing served in pages, for tests and dry wiring.
///
/// Continuation tokens are decimal offsets into the identifier list.
#[derive(Debug)]
pub struct InMemoryRunLister {
    identifiers: Vec<RunIdentifier>,
    page_size: usize,
    fail_at_page: Option<(usize, String)>,
    calls: AtomicUsize,
}

impl InMemoryRunLister {
    pub fn new<I, T>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RunIdentifier>,
    {
        Self {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            page_size: 1000,
            fail_at_page: None,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Return an access error instead of the page with index `page` (0-based).
    #[must_use]
    pub fn failing_at_page(mut self, page: usize, message: impl Into<String>) -> Self {
        self.fail_at_page = Some((page, message.into()));
        self
    }

    /// Number of `list_page` calls served, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunLister for InMemoryRunLister {
    async fn list_page(
        &self,
        _location: &ArchiveLocation,
        continuation: Option<String>,
    ) -> Result<ListingPage, ListingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let offset = match continuation {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                ListingError::Access(format!("unknown continuation token {token:?}"))
            })?,
        };
        if let Some((page, message)) = &self.fail_at_page {
            if offset / self.page_size == *page {
                return Err(ListingError::Access(message.clone()));
            }
        }
        let end = (offset + self.page_size).min(self.identifiers.len());
        let identifiers = self.identifiers.get(offset..end).unwrap_or_default().to_vec();
        let continuation = (end < self.identifiers.len()).then(|| end.to_string());
        Ok(ListingPage {
            identifiers,
            continuation,
        })
    }
}
