//! Application directory and component definition bundles.
//!
//! Component definitions are discovered as JSON files in a bundle directory,
//! by default `<data dir>/complytime/bundles`.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{ComplyTimeError, PlanError, Result, WorkspaceError};
use crate::oscal::{ComponentDefinition, ComponentDefinitionDocument};

/// Application directory name under the user data directory.
const APP_DIR: &str = "complytime";

/// Bundle subdirectory name.
const BUNDLE_DIR: &str = "bundles";

/// Locations of application data.
#[derive(Debug, Clone)]
pub struct ApplicationDirectory {
    /// Application root.
    root: PathBuf,
    /// Component definition bundles.
    bundle_dir: PathBuf,
}

impl ApplicationDirectory {
    /// Resolves the application directory under the user data directory.
    ///
    /// With `create` set, missing directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is known for this platform or
    /// the directories cannot be created.
    pub fn new(create: bool) -> Result<Self> {
        let root = dirs::data_dir()
            .ok_or_else(|| {
                ComplyTimeError::Workspace(WorkspaceError::DirectoryUnavailable {
                    message: String::from("cannot determine user data directory"),
                })
            })?
            .join(APP_DIR);

        let app_dir = Self {
            bundle_dir: root.join(BUNDLE_DIR),
            root,
        };
        if create {
            app_dir.create()?;
        }
        Ok(app_dir)
    }

    /// Uses an explicit bundle directory.
    #[must_use]
    pub fn with_bundle_dir(bundle_dir: impl Into<PathBuf>) -> Self {
        let bundle_dir = bundle_dir.into();
        let root = bundle_dir
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self { root, bundle_dir }
    }

    /// Application root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Component definition bundle directory.
    #[must_use]
    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    fn create(&self) -> Result<()> {
        std::fs::create_dir_all(&self.bundle_dir).map_err(|e| {
            ComplyTimeError::Workspace(WorkspaceError::DirectoryUnavailable {
                message: format!("Failed to create {}: {e}", self.bundle_dir.display()),
            })
        })
    }
}

/// Loads every component definition in `dir`, ordered by file name.
///
/// JSON files without a `component-definition` root are skipped.
///
/// # Errors
///
/// Returns an error if the directory cannot be read, a component definition
/// is malformed, or no component definitions are found.
pub async fn find_component_definitions(dir: impl AsRef<Path>) -> Result<Vec<ComponentDefinition>> {
    let dir = dir.as_ref();
    info!("Searching for component definitions in: {}", dir.display());

    let mut entries = fs::read_dir(dir).await.map_err(|e| {
        ComplyTimeError::Workspace(WorkspaceError::DirectoryUnavailable {
            message: format!("Failed to read {}: {e}", dir.display()),
        })
    })?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut definitions = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path).await?;

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping {}: not JSON ({e})", path.display());
                continue;
            }
        };
        if value.get("component-definition").is_none() {
            debug!("Skipping {}: not a component definition", path.display());
            continue;
        }

        let document: ComponentDefinitionDocument =
            serde_json::from_value(value).map_err(|e| {
                ComplyTimeError::Plan(PlanError::ParseError {
                    message: e.to_string(),
                    location: Some(path.display().to_string()),
                })
            })?;
        debug!("Loaded component definition: {}", path.display());
        definitions.push(document.component_definition);
    }

    if definitions.is_empty() {
        return Err(ComplyTimeError::Plan(PlanError::NoComponentDefinitions {
            path: dir.display().to_string(),
        }));
    }

    info!("Found {} component definition(s)", definitions.len());
    Ok(definitions)
}
