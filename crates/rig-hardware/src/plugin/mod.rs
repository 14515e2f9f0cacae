//! Plugin discovery.
//!
//! - [`manifest`]: YAML unit manifest format and validation
//! - [`discovery`]: recursive, sorted scan of the plugin tree
//! - [`registry`]: symbol resolution, interface matching, and the plugin indices

pub mod discovery;
pub mod manifest;
pub mod registry;

pub use discovery::{UnitScanner, DEFAULT_EXTENSIONS};
pub use manifest::{ExportEntry, ManifestError, UnitManifest};
pub use registry::{Plugin, PluginRegistry, PluginSummary};
