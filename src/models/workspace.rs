// workspace-billing-service/src/models/workspace.rs
use crate::models::ServiceError;
use crate::services::trial_lifecycle::{compute_trial_end_date, TrialState};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

// The only subscription status the billing provider reports for a paid plan
pub const ACTIVE_SUBSCRIPTION_STATUS: &str = "active";

lazy_static! {
    static ref WORKSPACE_NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._\-]{0,63}$").unwrap();
    static ref SUBSCRIPTION_STATUS_RE: Regex = Regex::new(r"^[a-z][a-z_]{0,31}$").unwrap();
}

// Tenant record owning billing state
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub subscription_status: Option<String>,
    #[serde(default)]
    pub trial_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    // Create a new workspace whose trial starts at `created_at`
    pub fn new(name: String, owner_id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            owner_id,
            subscription_status: None,
            trial_end_date: Some(compute_trial_end_date(created_at)),
            created_at,
        }
    }

    pub fn has_active_subscription(&self) -> bool {
        self.subscription_status.as_deref() == Some(ACTIVE_SUBSCRIPTION_STATUS)
    }
}

// Request to create a new workspace
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

impl CreateWorkspaceRequest {
    // Returns the trimmed name if it is acceptable
    pub fn validated_name(&self) -> Result<String, ServiceError> {
        let name = self.name.trim();
        if !WORKSPACE_NAME_RE.is_match(name) {
            return Err(ServiceError::BadRequest(
                "Workspace name must be 1-64 characters of letters, digits, spaces, '.', '_' or '-'".to_string(),
            ));
        }
        Ok(name.to_string())
    }
}

// Status pushed by the billing provider when a subscription changes
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub subscription_status: String,
}

impl UpdateSubscriptionRequest {
    pub fn validated_status(&self) -> Result<String, ServiceError> {
        let status = self.subscription_status.trim();
        if !SUBSCRIPTION_STATUS_RE.is_match(status) {
            return Err(ServiceError::BadRequest(format!(
                "Invalid subscription status: '{}'",
                self.subscription_status
            )));
        }
        Ok(status.to_string())
    }
}

// What the frontend router needs to decide whether to render the app
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceAccess {
    pub workspace_id: String,
    pub state: TrialState,
    // None when the workspace has no trial end date to compare against
    pub is_in_trial: Option<bool>,
    pub is_trial_expired: bool,
    pub trial_end_date: Option<DateTime<Utc>>,
}
