//! Local file-based workspace.
//!
//! The workspace is a directory holding `assessment-plan.json`, the scope
//! configuration and a lock file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ComplyTimeError, PlanError, Result, WorkspaceError};
use crate::oscal::{AssessmentPlan, PlanDocument};

use super::lock::{LOCK_EXPIRY_SECS, LockInfo, generate_holder_id};
use super::store::PlanStore;

/// Default workspace directory.
pub const DEFAULT_WORKSPACE: &str = "./complytime";

/// Assessment plan file name.
pub const PLAN_FILE: &str = "assessment-plan.json";

/// Lock file name.
const LOCK_FILE: &str = ".complytime.lock";

/// Local workspace directory.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    /// Workspace directory.
    root: PathBuf,
    /// Path to the plan file.
    plan_path: PathBuf,
    /// Path to the lock file.
    lock_path: PathBuf,
}

impl LocalWorkspace {
    /// Creates a workspace rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let plan_path = root.join(PLAN_FILE);
        let lock_path = root.join(LOCK_FILE);

        Self {
            root,
            plan_path,
            lock_path,
        }
    }

    /// Workspace directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the assessment plan file.
    #[must_use]
    pub fn plan_path(&self) -> &Path {
        &self.plan_path
    }

    /// Loads the plan, failing when none has been written.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::NotFound`] if the plan file is missing.
    pub async fn require_plan(&self) -> Result<AssessmentPlan> {
        self.load().await?.ok_or_else(|| {
            ComplyTimeError::Plan(PlanError::NotFound {
                workspace: self.root.clone(),
            })
        })
    }

    /// Ensures the workspace directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            debug!("Creating workspace directory: {}", self.root.display());
            fs::create_dir_all(&self.root).await.map_err(|e| {
                ComplyTimeError::Workspace(WorkspaceError::DirectoryUnavailable {
                    message: format!("Failed to create {}: {e}", self.root.display()),
                })
            })?;
        }
        Ok(())
    }

    /// Reads the lock file if it exists.
    async fn read_lock_file(&self) -> Result<Option<LockInfo>> {
        if !self.lock_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.lock_path).await.map_err(|e| {
            ComplyTimeError::Workspace(WorkspaceError::Corrupted {
                message: format!("Failed to read lock file: {e}"),
            })
        })?;

        let lock_info: LockInfo = serde_json::from_str(&content).map_err(|e| {
            ComplyTimeError::Workspace(WorkspaceError::Corrupted {
                message: format!("Failed to parse lock file: {e}"),
            })
        })?;

        Ok(Some(lock_info))
    }

    /// Writes the lock file.
    async fn write_lock_file(&self, lock_info: &LockInfo) -> Result<()> {
        self.ensure_dir().await?;

        let content = serde_json::to_string_pretty(lock_info)
            .map_err(|e| WorkspaceError::lock(format!("Failed to serialize lock: {e}")))?;

        let mut file = fs::File::create(&self.lock_path)
            .await
            .map_err(|e| WorkspaceError::lock(format!("Failed to create lock file: {e}")))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| WorkspaceError::lock(format!("Failed to write lock file: {e}")))?;

        file.sync_all()
            .await
            .map_err(|e| WorkspaceError::lock(format!("Failed to sync lock file: {e}")))?;

        Ok(())
    }

    /// Deletes the lock file.
    async fn delete_lock_file(&self) -> Result<()> {
        if self.lock_path.exists() {
            fs::remove_file(&self.lock_path)
                .await
                .map_err(|e| WorkspaceError::lock(format!("Failed to delete lock file: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl PlanStore for LocalWorkspace {
    async fn load(&self) -> Result<Option<AssessmentPlan>> {
        if !self.plan_path.exists() {
            debug!("Plan file does not exist: {}", self.plan_path.display());
            return Ok(None);
        }

        info!("Loading assessment plan from: {}", self.plan_path.display());

        let content = fs::read_to_string(&self.plan_path).await?;

        let document = PlanDocument::from_json(&content).map_err(|e| {
            ComplyTimeError::Plan(PlanError::ParseError {
                message: e.to_string(),
                location: Some(self.plan_path.display().to_string()),
            })
        })?;

        Ok(Some(document.assessment_plan))
    }

    async fn save(&self, plan: &AssessmentPlan) -> Result<()> {
        self.ensure_dir().await?;

        info!("Writing assessment plan to: {}", self.plan_path.display());

        let document = PlanDocument::from(plan.clone());
        let content = document.to_json_pretty().map_err(|e| {
            ComplyTimeError::Plan(PlanError::SerializationError {
                message: e.to_string(),
            })
        })?;

        // Write to a temporary file first, then rename over the plan
        let temp_path = self.plan_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.plan_path).await?;

        debug!("Assessment plan saved");
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.plan_path.exists())
    }

    async fn acquire_lock(&self, holder: &str) -> Result<LockInfo> {
        if let Some(existing) = self.read_lock_file().await? {
            if !existing.is_expired() {
                return Err(ComplyTimeError::Workspace(WorkspaceError::LockedByOther {
                    holder: existing.holder,
                    since: existing.acquired_at.to_rfc3339(),
                }));
            }
            debug!("Expired lock found, taking over");
        }

        let holder_id = if holder.is_empty() {
            generate_holder_id()
        } else {
            holder.to_string()
        };

        let lock_info = LockInfo::new(&holder_id);
        self.write_lock_file(&lock_info).await?;

        info!(
            "Acquired workspace lock: {} (expires in {}s)",
            lock_info.lock_id, LOCK_EXPIRY_SECS
        );

        Ok(lock_info)
    }

    async fn release_lock(&self, lock_id: &str) -> Result<()> {
        if let Some(existing) = self.read_lock_file().await? {
            if existing.lock_id == lock_id {
                self.delete_lock_file().await?;
                debug!("Released workspace lock: {lock_id}");
            } else {
                debug!(
                    "Lock ID mismatch: expected {lock_id}, found {}",
                    existing.lock_id
                );
            }
        }
        Ok(())
    }

    async fn get_lock_info(&self) -> Result<Option<LockInfo>> {
        self.read_lock_file().await
    }
}
