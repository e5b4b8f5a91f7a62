//! Run identifier model and cutoff classification.
//!
//! A run identifier is an opaque key whose trailing segment carries the run
//! timestamp in the fixed layout `YYYY-MM-DD-HH-MM-SS/`. Runs stamped strictly
//! before the cutoff are considered already handled and are marked as skipped
//! in the manifest; everything else is left for the pipeline.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Layout of the cutoff supplied on the command line.
pub const CUTOFF_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Layout of the trailing timestamp segment of a run identifier.
pub const RUN_SUFFIX_FORMAT: &str = "%Y-%m-%d-%H-%M-%S/";

/// Width of `YYYY-MM-DD-HH-MM-SS/`.
pub const RUN_SUFFIX_LEN: usize = 20;

// Zero-padded fields only; seconds stop at 59 so leap seconds are rejected.
static STAMP_LAYOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-9]{2}-[0-5][0-9]$")
        .expect("static timestamp pattern")
});

/// Parse a bare `YYYY-MM-DD-HH-MM-SS` stamp, rejecting anything chrono would
/// tolerate beyond that exact layout.
fn parse_stamp(stamp: &str) -> Result<NaiveDateTime, String> {
    if !STAMP_LAYOUT.is_match(stamp) {
        return Err(format!("{stamp:?} is not laid out as {CUTOFF_FORMAT}"));
    }
    NaiveDateTime::parse_from_str(stamp, CUTOFF_FORMAT).map_err(|err| format!("{stamp:?}: {err}"))
}

/// Opaque token naming one archived processing run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunIdentifier(String);

impl RunIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the timestamp encoded in the trailing segment.
    pub fn timestamp(&self) -> Result<NaiveDateTime, FormatError> {
        let len = self.0.len();
        if len < RUN_SUFFIX_LEN {
            return Err(FormatError::new(
                self,
                format!("shorter than the {RUN_SUFFIX_LEN}-character timestamp suffix"),
            ));
        }
        let suffix = self
            .0
            .get(len - RUN_SUFFIX_LEN..)
            .ok_or_else(|| FormatError::new(self, "timestamp suffix is not valid text"))?;
        let stamp = suffix
            .strip_suffix('/')
            .ok_or_else(|| FormatError::new(self, "missing trailing separator"))?;
        parse_stamp(stamp).map_err(|reason| FormatError::new(self, reason))
    }
}

impl fmt::Display for RunIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RunIdentifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Boundary before which runs are presumed already processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CutoffDate(NaiveDateTime);

impl CutoffDate {
    pub fn parse(input: &str) -> Result<Self, CutoffParseError> {
        parse_stamp(input)
            .map(Self)
            .map_err(|reason| CutoffParseError {
                input: input.to_string(),
                reason,
            })
    }

    pub const fn from_datetime(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl FromStr for CutoffDate {
    type Err = CutoffParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CutoffDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CUTOFF_FORMAT))
    }
}

/// Outcome of classifying one run against the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Older than the cutoff: record a skip marker.
    Skip,
    /// At or after the cutoff: leave for the pipeline.
    Process,
}

/// Classify `identifier` against `cutoff`.
///
/// The comparison is strict, so a run stamped exactly at the cutoff is
/// processed rather than skipped.
pub fn classify(identifier: &RunIdentifier, cutoff: &CutoffDate) -> Result<Classification, FormatError> {
    let stamped = identifier.timestamp()?;
    if stamped < cutoff.0 {
        Ok(Classification::Skip)
    } else {
        Ok(Classification::Process)
    }
}

/// `true` when the run predates the cutoff and should be marked as skipped.
pub fn should_skip(identifier: &RunIdentifier, cutoff: &CutoffDate) -> Result<bool, FormatError> {
    classify(identifier, cutoff).map(|outcome| outcome == Classification::Skip)
}

/// A run identifier whose trailing segment is not a timestamp.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("run id {identifier:?} does not end with a {RUN_SUFFIX_FORMAT} timestamp: {reason}")]
pub struct FormatError {
    pub identifier: String,
    pub reason: String,
}

impl FormatError {
    fn new(identifier: &RunIdentifier, reason: impl Into<String>) -> Self {
        Self {
            identifier: identifier.0.clone(),
            reason: reason.into(),
        }
    }
}

/// The cutoff did not match [`CUTOFF_FORMAT`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cutoff {input:?} must conform to {CUTOFF_FORMAT}: {reason}")]
pub struct CutoffParseError {
    pub input: String,
    pub reason: String,
}
