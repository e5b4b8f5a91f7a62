//! Driver settings assembled by the binary from command-line input.

use run_classifier::CutoffDate;

/// Value written to `AddedBy` on every skip record.
pub const TOOL_VERSION: &str = "backfill-script-0.1.0";

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub cutoff: CutoffDate,
    pub tool_version: String,
}

impl BackfillConfig {
    pub fn new(cutoff: CutoffDate) -> Self {
        Self {
            cutoff,
            tool_version: TOOL_VERSION.to_string(),
        }
    }
}
