use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// One metered quantity for one workspace
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub workspace_id: String,
    pub quantity: u64,
    pub timestamp: DateTime<Utc>,
}

// Outcome of a single usage reporting pass
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UsageReportSummary {
    pub reported: usize,
    pub skipped: usize,
    pub failed: usize,
}
