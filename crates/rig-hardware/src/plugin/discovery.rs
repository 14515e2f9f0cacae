//! Plugin tree scanning.
//!
//! [`UnitScanner`] walks a plugin root recursively and returns every unit
//! manifest it finds, sorted by path relative to the root. The order is what
//! makes "first registration wins" deterministic, so the scan never depends
//! on the order the filesystem happens to list entries in.
//!
//! Symbolic links to directories are not followed.

use std::path::{Path, PathBuf};

use rig_core::error::{RigError, RigResult};

/// Default unit file extensions.
pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Recursive, sorted scanner for unit manifests.
#[derive(Debug, Clone)]
pub struct UnitScanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl UnitScanner {
    /// Scanner over `root` with the default extensions.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the accepted extensions (compared case-insensitively, no dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All unit files under the root, sorted by relative path.
    ///
    /// # Errors
    /// [`RigError::PluginLoadFailure`] if the root is missing, is not a
    /// directory, or any directory under it cannot be read.
    pub fn scan(&self) -> RigResult<Vec<PathBuf>> {
        if !self.root.exists() {
            return Err(load_failure(&self.root, "plugin root does not exist"));
        }
        if !self.root.is_dir() {
            return Err(load_failure(&self.root, "plugin root is not a directory"));
        }

        let mut relative = Vec::new();
        self.walk(&self.root, &mut relative)?;
        relative.sort();

        tracing::debug!(
            root = %self.root.display(),
            units = relative.len(),
            "Scanned plugin tree"
        );
        Ok(relative.into_iter().map(|rel| self.root.join(rel)).collect())
    }

    fn walk(&self, dir: &Path, found: &mut Vec<PathBuf>) -> RigResult<()> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| load_failure(dir, format!("Failed to read directory: {}", e)))?;

        for entry in entries {
            let entry =
                entry.map_err(|e| load_failure(dir, format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| load_failure(&path, format!("Failed to stat: {}", e)))?;

            if file_type.is_dir() {
                self.walk(&path, found)?;
            } else if file_type.is_file() && self.accepts(&path) {
                // strip_prefix cannot fail for paths produced by walking root
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    found.push(rel.to_path_buf());
                }
            }
        }
        Ok(())
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

fn load_failure(path: &Path, message: impl Into<String>) -> RigError {
    RigError::PluginLoadFailure {
        path: path.to_path_buf(),
        message: message.into(),
    }
}
