//! Configuration loading.
//!
//! Configuration is a JSON document; every field is optional:
//!
//! ```json
//! {
//!   "validation": { "max_task_minutes": 15, "require_tests": true },
//!   "generator": { "require_commits": true },
//!   "execution": { "stop_on_error": false, "step_policy": "lenient" }
//! }
//! ```
//!
//! [`ConfigLoader`] reads an explicit file when one is given, otherwise
//! `$XDG_CONFIG_HOME/plankit/config.json` if it exists, otherwise defaults.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PlanKitError, Result, ResultExt},
    executor::{ExecuteOptions, StepPolicy},
    generator::GeneratorConfig,
    validator::ValidationOptions,
};

/// File name looked up in the XDG config directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanKitConfig {
    pub validation: ValidationOptions,
    pub generator: GeneratorConfig,
    pub execution: ExecutionDefaults,
}

/// Defaults for `run`; command-line flags override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionDefaults {
    pub stop_on_error: bool,
    pub step_policy: StepPolicy,
    /// Directory commands run in; the current directory when unset
    pub working_directory: Option<PathBuf>,
}

impl Default for ExecutionDefaults {
    fn default() -> Self {
        Self {
            stop_on_error: true,
            step_policy: StepPolicy::Strict,
            working_directory: None,
        }
    }
}

impl ExecutionDefaults {
    /// Executor options seeded from these defaults.
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            stop_on_error: self.stop_on_error,
            step_policy: self.step_policy,
            ..Default::default()
        }
    }
}

impl PlanKitConfig {
    /// Rejects settings that contradict each other.
    pub fn check(&self) -> Result<()> {
        let validation = &self.validation;
        if validation.min_task_minutes > validation.max_task_minutes {
            return Err(PlanKitError::invalid_input("validation.min_task_minutes")
                .with_reason(format!(
                    "must not exceed max_task_minutes ({})",
                    validation.max_task_minutes
                )));
        }
        if validation.min_steps_per_task > validation.max_steps_per_task {
            return Err(PlanKitError::invalid_input("validation.min_steps_per_task")
                .with_reason(format!(
                    "must not exceed max_steps_per_task ({})",
                    validation.max_steps_per_task
                )));
        }
        Ok(())
    }
}

/// Locates and reads the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Uses an explicit configuration file instead of the XDG lookup.
    ///
    /// Unlike the XDG default, an explicit file must exist.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.config_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Loads the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlanKitError::FileSystem` if an explicit file cannot be read,
    /// `PlanKitError::Configuration` if the file is not valid configuration
    /// JSON, and `PlanKitError::InvalidInput` for contradictory settings.
    pub fn load(&self) -> Result<PlanKitConfig> {
        let path = match &self.config_path {
            Some(path) => Some(path.clone()),
            None => Self::default_config_path(),
        };

        let config = match path {
            Some(path) => Self::read(&path)?,
            None => {
                debug!("no configuration file found, using defaults");
                PlanKitConfig::default()
            }
        };
        config.check()?;
        Ok(config)
    }

    /// Existing configuration file in the XDG config directories, if any.
    pub fn default_config_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("plankit").find_config_file(CONFIG_FILE)
    }

    fn read(path: &Path) -> Result<PlanKitConfig> {
        debug!("loading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| PlanKitError::file_system(path, e))?;
        serde_json::from_str(&text).with_context(format!("Invalid config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = config_file(
            r#"{ "validation": { "require_tests": true }, "execution": { "step_policy": "lenient" } }"#,
        );
        let config = ConfigLoader::new()
            .with_config_path(Some(file.path()))
            .load()
            .unwrap();

        assert!(config.validation.require_tests);
        assert_eq!(config.validation.max_task_minutes, 10);
        assert_eq!(config.execution.step_policy, StepPolicy::Lenient);
        assert!(config.execution.stop_on_error);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = ConfigLoader::new()
            .with_config_path(Some(&missing))
            .load()
            .unwrap_err();
        assert!(matches!(err, PlanKitError::FileSystem { .. }));
    }

    #[test]
    fn test_malformed_config() {
        let file = config_file("{ not json");
        let err = ConfigLoader::new()
            .with_config_path(Some(file.path()))
            .load()
            .unwrap_err();
        assert!(matches!(err, PlanKitError::Configuration { .. }));
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_contradictory_bounds_rejected() {
        let file = config_file(r#"{ "validation": { "min_task_minutes": 30 } }"#);
        let err = ConfigLoader::new()
            .with_config_path(Some(file.path()))
            .load()
            .unwrap_err();
        assert!(matches!(
            err,
            PlanKitError::InvalidInput { ref field, .. } if field == "validation.min_task_minutes"
        ));
    }

    #[test]
    fn test_execute_options_from_defaults() {
        let defaults = ExecutionDefaults {
            stop_on_error: false,
            step_policy: StepPolicy::Lenient,
            working_directory: None,
        };
        let options = defaults.execute_options();
        assert!(!options.stop_on_error);
        assert_eq!(options.step_policy, StepPolicy::Lenient);
        assert!(!options.dry_run);
    }
}
