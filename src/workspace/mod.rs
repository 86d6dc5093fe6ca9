//! Workspace persistence for ComplyTime.
//!
//! This module stores the assessment plan on disk, guards writes with a
//! lock file and discovers component definition bundles.

mod bundle;
mod local;
mod lock;
mod store;

pub use bundle::{ApplicationDirectory, find_component_definitions};
pub use local::{DEFAULT_WORKSPACE, LocalWorkspace, PLAN_FILE};
pub use lock::{LOCK_EXPIRY_SECS, LockInfo, generate_holder_id};
pub use store::PlanStore;
