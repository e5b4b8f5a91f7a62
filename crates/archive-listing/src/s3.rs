use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::Client;
use run_classifier::RunIdentifier;

use crate::{ArchiveLocation, ListingError, ListingPage, RunLister};

const DELIMITER: &str = "/";

/// Lists run folders as S3 common prefixes below the archive prefix.
#[derive(Debug, Clone)]
pub struct S3RunLister {
    client: Client,
}

impl S3RunLister {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RunLister for S3RunLister {
    async fn list_page(
        &self,
        location: &ArchiveLocation,
        continuation: Option<String>,
    ) -> Result<ListingPage, ListingError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(location.bucket())
            .set_prefix(location.prefix().map(str::to_string))
            .delimiter(DELIMITER)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(|err| {
                ListingError::Access(format!(
                    "list_objects_v2 on {location} failed: {}",
                    DisplayErrorContext(&err)
                ))
            })?;
        Ok(page_from_output(&output))
    }
}

fn page_from_output(output: &ListObjectsV2Output) -> ListingPage {
    let identifiers = output
        .common_prefixes()
        .iter()
        .filter_map(|common| common.prefix())
        .map(RunIdentifier::from)
        .collect();
    let continuation = if output.is_truncated().unwrap_or(false) {
        output.next_continuation_token().map(str::to_string)
    } else {
        None
    };
    ListingPage {
        identifiers,
        continuation,
    }
}
