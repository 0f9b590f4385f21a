// workspace-billing-service/src/services/trial_lifecycle.rs
//
// Read-only classification of a workspace's billing state. Every function
// takes `now` explicitly; request handlers pass `Utc::now()`.
use crate::models::{ServiceError, Workspace};
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

pub const TRIAL_PERIOD_DAYS: u64 = 7;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "trialing")]
    Trialing,
    // now == trial end date: neither in trial nor expired
    #[serde(rename = "boundary")]
    Boundary,
    #[serde(rename = "expired")]
    Expired,
    // Not paid and no trial end date recorded
    #[serde(rename = "unknown")]
    Unknown,
}

// Trial ends seven calendar days after creation
pub fn compute_trial_end_date(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at
        .checked_add_days(Days::new(TRIAL_PERIOD_DAYS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// Fails with InvalidState when the workspace has no trial end date, even if
// it is on a paid plan.
pub fn is_in_trial(workspace: &Workspace, now: DateTime<Utc>) -> Result<bool, ServiceError> {
    let trial_end_date = workspace.trial_end_date.ok_or_else(|| {
        ServiceError::InvalidState(format!("workspace {} has no trial end date", workspace.id))
    })?;

    if workspace.has_active_subscription() {
        return Ok(false);
    }

    Ok(now < trial_end_date)
}

// Never fails: a missing trial end date counts as not expired.
pub fn is_trial_expired(workspace: &Workspace, now: DateTime<Utc>) -> bool {
    if workspace.has_active_subscription() {
        return false;
    }

    match workspace.trial_end_date {
        Some(trial_end_date) => now > trial_end_date,
        None => false,
    }
}

pub fn classify(workspace: &Workspace, now: DateTime<Utc>) -> TrialState {
    if workspace.has_active_subscription() {
        return TrialState::Active;
    }

    match workspace.trial_end_date {
        None => TrialState::Unknown,
        Some(end) if now < end => TrialState::Trialing,
        Some(end) if now > end => TrialState::Expired,
        Some(_) => TrialState::Boundary,
    }
}
