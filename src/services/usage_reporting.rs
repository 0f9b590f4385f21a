// workspace-billing-service/src/services/usage_reporting.rs
//
// Periodic metering of paid workspaces. Each workspace is handled on its own:
// a failure is logged and the pass moves on to the next one.
use crate::models::{ServiceError, UsageRecord, UsageReportSummary, Workspace};
use crate::services::trial_lifecycle::{classify, TrialState};
use crate::utils::WorkspaceStore;
use actix_web::{rt, web};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const ACTIVE_RECORD_STATUS: &str = "active";

// Source of the billable quantity for a workspace
pub trait ActiveRecordCounter: Send + Sync {
    fn count_active_records(&self, workspace: &Workspace) -> Result<u64, ServiceError>;
}

// Metering provider
pub trait UsageReporter: Send + Sync {
    fn report(&self, record: &UsageRecord) -> Result<(), ServiceError>;
}

// Counts `<root>/records/<workspace_id>/*.json` whose "status" is "active"
pub struct FileRecordCounter {
    store: WorkspaceStore,
}

impl FileRecordCounter {
    pub fn new(store: WorkspaceStore) -> Self {
        Self { store }
    }
}

impl ActiveRecordCounter for FileRecordCounter {
    fn count_active_records(&self, workspace: &Workspace) -> Result<u64, ServiceError> {
        let dir: PathBuf = self.store.records_dir(&workspace.id);
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            error!("Failed to read records directory {}: {:?}", dir.display(), e);
            ServiceError::InternalServerError
        })?;

        let mut count = 0;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Failed to read record entry: {:?}", e);
                    continue;
                }
            };

            if !(path.is_file() && path.extension().map_or(false, |ext| ext == "json")) {
                continue;
            }

            let record: serde_json::Value = match fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str(&content).ok())
            {
                Some(record) => record,
                None => {
                    warn!("Skipping unreadable record: {}", path.display());
                    continue;
                }
            };

            if record.get("status").and_then(|s| s.as_str()) == Some(ACTIVE_RECORD_STATUS) {
                count += 1;
            }
        }

        Ok(count)
    }
}

// Stands in for the payment provider's metering endpoint
pub struct LogUsageReporter;

impl UsageReporter for LogUsageReporter {
    fn report(&self, record: &UsageRecord) -> Result<(), ServiceError> {
        info!(
            "📊 Usage for workspace {}: {} active records at {}",
            record.workspace_id,
            record.quantity,
            record.timestamp.to_rfc3339()
        );
        Ok(())
    }
}

// Only paid workspaces are metered
pub fn should_meter(workspace: &Workspace, now: DateTime<Utc>) -> bool {
    classify(workspace, now) == TrialState::Active
}

// One best-effort pass over every workspace
pub fn report_usage(
    store: &WorkspaceStore,
    counter: &dyn ActiveRecordCounter,
    reporter: &dyn UsageReporter,
    now: DateTime<Utc>,
) -> Result<UsageReportSummary, ServiceError> {
    let workspaces = store.list_workspaces()?;
    let mut summary = UsageReportSummary::default();

    for workspace in &workspaces {
        if !should_meter(workspace, now) {
            debug!("Skipping usage for workspace {}: {:?}", workspace.id, classify(workspace, now));
            summary.skipped += 1;
            continue;
        }

        let result = counter.count_active_records(workspace).and_then(|quantity| {
            reporter.report(&UsageRecord {
                workspace_id: workspace.id.clone(),
                quantity,
                timestamp: now,
            })
        });

        match result {
            Ok(()) => summary.reported += 1,
            Err(e) => {
                error!("❌ Failed to report usage for workspace {}: {}", workspace.id, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "✅ Usage pass finished: {} reported, {} skipped, {} failed",
        summary.reported, summary.skipped, summary.failed
    );
    Ok(summary)
}

// Run report_usage on a fixed interval on the actix runtime. The first pass
// happens one full interval after startup.
pub fn spawn_usage_reporting(
    store: WorkspaceStore,
    counter: Arc<dyn ActiveRecordCounter>,
    reporter: Arc<dyn UsageReporter>,
    interval: Duration,
) {
    rt::spawn(async move {
        let mut ticker = rt::time::interval(interval);
        // interval() completes its first tick immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = run_usage_pass(store.clone(), counter.clone(), reporter.clone()).await {
                error!("❌ Usage reporting pass failed: {}", e);
            }
        }
    });
}

// One pass on the blocking thread pool; the store and counter read files
pub async fn run_usage_pass(
    store: WorkspaceStore,
    counter: Arc<dyn ActiveRecordCounter>,
    reporter: Arc<dyn UsageReporter>,
) -> Result<UsageReportSummary, ServiceError> {
    web::block(move || report_usage(&store, counter.as_ref(), reporter.as_ref(), Utc::now()))
        .await
        .map_err(|e| {
            error!("❌ Usage reporting task did not complete: {:?}", e);
            ServiceError::InternalServerError
        })?
}
