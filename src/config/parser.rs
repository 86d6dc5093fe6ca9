//! Configuration parser for loading scope configuration files.
//!
//! This module handles loading scope configuration from YAML files and
//! environment variables, with proper precedence and error handling.

use crate::error::{ComplyTimeError, ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::spec::ScopeConfig;

/// Environment variable overriding `frameworkId`.
pub const ENV_FRAMEWORK_ID: &str = "COMPLYTIME_FRAMEWORK_ID";

/// Environment variable overriding `includeControls` (comma separated).
pub const ENV_INCLUDE_CONTROLS: &str = "COMPLYTIME_INCLUDE_CONTROLS";

/// Configuration parser for loading scope configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ScopeConfig> {
        let path = self.resolve(path.as_ref());
        info!("Loading scope configuration from: {}", path.display());

        if !path.exists() {
            return Err(ComplyTimeError::Config(ConfigError::FileNotFound { path }));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ComplyTimeError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(&path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// Repeated control identifiers are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ScopeConfig> {
        debug!("Parsing YAML scope configuration");

        let mut config: ScopeConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            ComplyTimeError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        let removed = config.dedup_controls();
        if removed > 0 {
            warn!("Dropped {removed} duplicate control id(s) from scope configuration");
        }

        debug!(
            "Parsed scope for framework {} with {} control(s)",
            config.framework_id,
            config.include_controls.len()
        );
        Ok(config)
    }

    /// Serializes a scope configuration to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(config: &ScopeConfig) -> Result<String> {
        serde_yaml::to_string(config).map_err(|e| {
            ComplyTimeError::Config(ConfigError::ParseError {
                message: format!("error marshalling yaml content: {e}"),
                location: None,
            })
        })
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Recognized variables are [`ENV_FRAMEWORK_ID`] and
    /// [`ENV_INCLUDE_CONTROLS`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<ScopeConfig> {
        let mut config = self.load_file(path)?;

        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok());

        Ok(config)
    }

    /// Applies overrides from the given variable lookup.
    pub fn apply_env_overrides<F>(config: &mut ScopeConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(framework_id) = lookup(ENV_FRAMEWORK_ID) {
            debug!("Overriding frameworkId from environment");
            config.framework_id = framework_id;
        }

        if let Some(controls) = lookup(ENV_INCLUDE_CONTROLS) {
            debug!("Overriding includeControls from environment");
            config.include_controls = controls
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
            config.dedup_controls();
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ComplyTimeError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Resolves a relative path against the base path.
    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Default scope configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["assessment-plan-filter.yml", "assessment-plan-filter.yaml"];

/// Finds the scope configuration file in a workspace directory.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(workspace: impl AsRef<Path>) -> Result<PathBuf> {
    let workspace = workspace.as_ref();

    for filename in DEFAULT_CONFIG_FILES {
        let config_path = workspace.join(filename);
        if config_path.exists() {
            info!("Found scope configuration: {}", config_path.display());
            return Ok(config_path);
        }
    }

    Err(ComplyTimeError::Config(ConfigError::FileNotFound {
        path: workspace.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
