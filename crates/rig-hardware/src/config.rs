//! Configuration using Figment
//!
//! Settings are loaded from:
//! 1. a TOML file (`config/rig.toml` by default)
//! 2. environment variables prefixed with `RIG_`, nested keys separated by
//!    a double underscore
//!
//! # Example
//! ```no_run
//! use rig_hardware::config::RigSettings;
//!
//! let settings = RigSettings::load()?;
//! settings.validate()?;
//! println!("Plugin root: {}", settings.plugins.root.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Override the plugin root from the environment:
//!
//! ```text
//! RIG_PLUGINS__ROOT=/opt/rig/plugins rigd check
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use rig_core::error::{RigError, RigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::plugin::{UnitScanner, DEFAULT_EXTENSIONS};

/// Default settings file.
pub const DEFAULT_CONFIG_PATH: &str = "config/rig.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RIG_";

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RigSettings {
    /// Application settings
    pub application: ApplicationSettings,
    /// Plugin discovery settings
    pub plugins: PluginSettings,
}

/// Application-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    /// Application name
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    pub log_format: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            name: "rig".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// Plugin discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Root of the plugin tree
    pub root: PathBuf,
    /// Unit file extensions, without the dot
    pub extensions: Vec<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("plugins"),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl PluginSettings {
    /// Scanner for the configured tree.
    pub fn scanner(&self) -> UnitScanner {
        UnitScanner::new(&self.root).with_extensions(self.extensions.iter().cloned())
    }
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

impl RigSettings {
    /// Load from `config/rig.toml` and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file and the environment.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Self::figment(path.as_ref()).extract()
    }

    /// The layered provider chain, exposed for callers that add layers.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(RigSettings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate settings after loading.
    pub fn validate(&self) -> RigResult<()> {
        let level = self.application.log_level.to_ascii_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(RigError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                VALID_LEVELS.join(", ")
            )));
        }

        let format = self.application.log_format.to_ascii_lowercase();
        if !VALID_FORMATS.contains(&format.as_str()) {
            return Err(RigError::Configuration(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                VALID_FORMATS.join(", ")
            )));
        }

        if self.plugins.extensions.is_empty()
            || self.plugins.extensions.iter().any(|e| e.trim().is_empty())
        {
            return Err(RigError::Configuration(
                "plugins.extensions must list at least one non-empty extension".to_string(),
            ));
        }

        if self.plugins.root.as_os_str().is_empty() {
            return Err(RigError::Configuration(
                "plugins.root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
