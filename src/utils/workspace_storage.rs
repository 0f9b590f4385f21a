// workspace-billing-service/src/utils/workspace_storage.rs
use crate::models::{ServiceError, Workspace};
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const WORKSPACES_DIR: &str = "workspaces";
const RECORDS_DIR: &str = "records";

// JSON file store, one file per workspace
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspaces_dir(&self) -> PathBuf {
        self.root.join(WORKSPACES_DIR)
    }

    // Business records of one workspace live here
    pub fn records_dir(&self, workspace_id: &str) -> PathBuf {
        self.root.join(RECORDS_DIR).join(workspace_id)
    }

    fn workspace_path(&self, workspace_id: &str) -> PathBuf {
        self.workspaces_dir().join(format!("{}.json", workspace_id))
    }

    // Initialize workspaces directory
    pub fn ensure_storage(&self) -> io::Result<()> {
        let dir = self.workspaces_dir();
        if !dir.exists() {
            info!("Creating workspaces directory: {}", dir.display());
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    // Save workspace to storage
    pub fn save_workspace(&self, workspace: &Workspace) -> Result<(), ServiceError> {
        self.ensure_storage().map_err(|e| {
            error!("Failed to create workspaces directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let workspace_json = serde_json::to_string_pretty(workspace).map_err(|e| {
            error!("Failed to serialize workspace: {:?}", e);
            ServiceError::InternalServerError
        })?;

        fs::write(self.workspace_path(&workspace.id), workspace_json).map_err(|e| {
            error!("Failed to save workspace: {:?}", e);
            ServiceError::InternalServerError
        })?;

        debug!("Saved workspace: {}", workspace.id);
        Ok(())
    }

    // Find workspace by ID
    pub fn find_workspace_by_id(&self, workspace_id: &str) -> Result<Option<Workspace>, ServiceError> {
        // IDs become file names
        if workspace_id.is_empty() || workspace_id.contains(|c| c == '/' || c == '\\' || c == '.') {
            return Ok(None);
        }

        let path = self.workspace_path(workspace_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read workspace file: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let workspace: Workspace = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse workspace JSON: {:?}", e);
            ServiceError::InternalServerError
        })?;

        Ok(Some(workspace))
    }

    // All workspaces, skipping files that fail to parse
    pub fn list_workspaces(&self) -> Result<Vec<Workspace>, ServiceError> {
        let dir = self.workspaces_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut workspaces = Vec::new();

        for entry_result in fs::read_dir(&dir).map_err(|e| {
            error!("Failed to read workspaces directory: {:?}", e);
            ServiceError::InternalServerError
        })? {
            let entry = entry_result.map_err(|e| {
                error!("Failed to read directory entry: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let path = entry.path();
            if !(path.is_file() && path.extension().map_or(false, |ext| ext == "json")) {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read workspace file {}: {:?}", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_str::<Workspace>(&content) {
                Ok(workspace) => workspaces.push(workspace),
                Err(e) => warn!("Failed to parse workspace JSON {}: {:?}", path.display(), e),
            }
        }

        workspaces.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(workspaces)
    }

    // Get all workspaces owned by a user
    pub fn get_workspaces_for_owner(&self, owner_id: &str) -> Result<Vec<Workspace>, ServiceError> {
        Ok(self
            .list_workspaces()?
            .into_iter()
            .filter(|workspace| workspace.owner_id == owner_id)
            .collect())
    }

    // Record a new billing status; the trial end date is left as created
    pub fn update_subscription_status(
        &self,
        workspace_id: &str,
        status: Option<String>,
    ) -> Result<Workspace, ServiceError> {
        let mut workspace = match self.find_workspace_by_id(workspace_id)? {
            Some(workspace) => workspace,
            None => return Err(ServiceError::NotFound),
        };

        workspace.subscription_status = status;
        self.save_workspace(&workspace)?;

        info!(
            "✅ Subscription status for workspace {} is now {:?}",
            workspace_id, workspace.subscription_status
        );
        Ok(workspace)
    }
}
