//! Plan store trait definition.
//!
//! This module defines the common interface for assessment plan storage.

use async_trait::async_trait;

use crate::error::Result;
use crate::oscal::AssessmentPlan;

use super::lock::LockInfo;

/// Trait for assessment plan storage backends.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Loads the assessment plan.
    ///
    /// Returns `None` if no plan has been written yet.
    async fn load(&self) -> Result<Option<AssessmentPlan>>;

    /// Saves the assessment plan.
    async fn save(&self, plan: &AssessmentPlan) -> Result<()>;

    /// Checks if a plan exists.
    async fn exists(&self) -> Result<bool>;

    /// Acquires the workspace lock.
    ///
    /// An empty holder generates one for the current process.
    async fn acquire_lock(&self, holder: &str) -> Result<LockInfo>;

    /// Releases the workspace lock.
    async fn release_lock(&self, lock_id: &str) -> Result<()>;

    /// Gets current lock information if locked.
    async fn get_lock_info(&self) -> Result<Option<LockInfo>>;
}
