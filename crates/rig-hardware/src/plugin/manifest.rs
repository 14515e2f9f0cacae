//! Plugin unit manifests.
//!
//! A unit is one YAML file in the plugin tree. It names the plugin classes it
//! exports and binds each to a plugin type symbol from the
//! [`DriverLibrary`](rig_core::DriverLibrary).
//!
//! # Example unit
//!
//! ```yaml
//! unit: lighting            # optional; defaults to the file stem
//! description: Lighting bus drivers
//! exports:
//!   - class_name: AcmeDimmer
//!     symbol: mock.dimmer
//!     description: Two-wire dimmer
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level unit manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitManifest {
    /// Unit name. Falls back to the file stem when absent.
    #[serde(default)]
    pub unit: Option<String>,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Exported plugin classes, in declaration order.
    #[serde(default)]
    pub exports: Vec<ExportEntry>,
}

/// One exported plugin class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportEntry {
    /// Class name, unique across the whole catalog.
    pub class_name: String,

    /// Plugin type symbol to resolve against the driver library.
    pub symbol: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

// =============================================================================
// Parsing and Loading
// =============================================================================

impl UnitManifest {
    /// Parses a unit manifest from YAML content.
    ///
    /// # Errors
    /// Returns error if the YAML is invalid or required fields are missing.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Loads and validates a unit manifest from a file path.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let manifest = Self::from_yaml(&content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        manifest.validate_or_err(path)?;
        Ok(manifest)
    }

    /// Unit name, or the file stem of `path` when the manifest omits it.
    pub fn unit_name(&self, path: &Path) -> String {
        match &self.unit {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Errors that can occur when loading a unit manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// File could not be read.
    #[error("Failed to read unit file {}: {source}", path.display())]
    Io {
        /// Unit path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid unit document.
    #[error("Failed to parse unit {}: {source}", path.display())]
    Parse {
        /// Unit path.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// File parsed but its exports are inconsistent.
    #[error("Validation failed for {}: {message}", path.display())]
    Validation {
        /// Unit path.
        path: PathBuf,
        /// All violations, joined.
        message: String,
    },
}

impl ManifestError {
    /// Path of the unit that failed.
    pub fn path(&self) -> &Path {
        match self {
            ManifestError::Io { path, .. }
            | ManifestError::Parse { path, .. }
            | ManifestError::Validation { path, .. } => path,
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// A specific validation error within a unit manifest.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the invalid field (e.g., "exports[0].symbol").
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl UnitManifest {
    /// Validates the manifest and returns any errors found.
    ///
    /// Validation checks:
    /// 1. Every export has a non-empty class name and symbol
    /// 2. A class name appears at most once within the unit
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for (i, export) in self.exports.iter().enumerate() {
            if export.class_name.trim().is_empty() {
                errors.push(ValidationError {
                    path: format!("exports[{}].class_name", i),
                    message: "Class name cannot be empty".to_string(),
                });
            } else if !seen.insert(export.class_name.as_str()) {
                errors.push(ValidationError {
                    path: format!("exports[{}].class_name", i),
                    message: format!("Class '{}' exported twice", export.class_name),
                });
            }

            if export.symbol.trim().is_empty() {
                errors.push(ValidationError {
                    path: format!("exports[{}].symbol", i),
                    message: "Symbol cannot be empty".to_string(),
                });
            }
        }

        errors
    }

    /// Validates the manifest and returns an error if validation fails.
    pub fn validate_or_err(&self, path: &Path) -> Result<(), ManifestError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Err(ManifestError::Validation {
                path: path.to_path_buf(),
                message: messages.join("; "),
            })
        }
    }
}
