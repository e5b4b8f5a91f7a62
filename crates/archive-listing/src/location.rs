use std::fmt;
use std::str::FromStr;

use crate::error::ListingError;

const SCHEMES: [&str; 3] = ["s3://", "s3n://", "s3a://"];

/// Bucket and key prefix of an archive, parsed from an `s3://` style URL.
///
/// The prefix is normalised to end with `/` so that delimiter listing returns
/// the run folders directly below it. An empty prefix addresses the bucket
/// root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    bucket: String,
    prefix: Option<String>,
}

impl ArchiveLocation {
    pub fn parse(url: &str) -> Result<Self, ListingError> {
        let trimmed = url.trim();
        let rest = SCHEMES
            .iter()
            .find_map(|scheme| trimmed.strip_prefix(scheme))
            .ok_or_else(|| {
                ListingError::InvalidLocation(format!(
                    "{url:?} should start with s3://, s3n:// or s3a://"
                ))
            })?;
        let (bucket, path) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(ListingError::InvalidLocation(format!(
                "{url:?} is missing a bucket name"
            )));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            prefix: normalize_prefix(path),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

fn normalize_prefix(path: &str) -> Option<String> {
    match path {
        "" | "/" => None,
        p if p.ends_with('/') => Some(p.to_string()),
        p => Some(format!("{p}/")),
    }
}

impl FromStr for ArchiveLocation {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArchiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix.as_deref().unwrap_or(""))
    }
}
