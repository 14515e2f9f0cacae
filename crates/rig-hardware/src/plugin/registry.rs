//! Plugin registry.
//!
//! [`PluginRegistry`] is built once at startup. It scans the plugin tree,
//! loads every unit manifest, resolves each exported symbol against the
//! [`DriverLibrary`], and binds the resulting type to the first capability
//! interface its declared operation surface satisfies.
//!
//! # Loading rules
//!
//! - Units are processed in sorted relative-path order
//! - A unit that cannot be read, parsed, or validated aborts initialization
//! - An export whose symbol is not in the library aborts initialization
//! - A type that satisfies no interface is skipped (debug log)
//! - A class name that is already registered is skipped (warn log naming
//!   both units); the earlier unit keeps it
//!
//! The registry is read-only once built.
//!
//! # Example
//!
//! ```rust,ignore
//! let scanner = UnitScanner::new("plugins");
//! let registry = PluginRegistry::initialize(&scanner, &interfaces, &library)?;
//!
//! for name in registry.get_plugin_names_by_interface("DimmerPluginInterface") {
//!     println!("dimmer plugin: {name}");
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rig_core::driver::{ConfigParam, DriverLibrary, PluginType};
use rig_core::error::{RigError, RigResult};
use rig_core::interface::InterfaceCatalog;
use serde::Serialize;

use super::discovery::UnitScanner;
use super::manifest::UnitManifest;

// =============================================================================
// Plugin
// =============================================================================

/// A registered plugin class.
///
/// Immutable after registration; shared as `Arc<Plugin>`.
pub struct Plugin {
    /// Catalog-wide unique class name.
    pub class_name: String,
    /// Name of the unit that exported it.
    pub unit: String,
    /// Unit file it came from.
    pub source: PathBuf,
    /// Description from the unit manifest.
    pub description: String,
    /// Name of the capability interface it was matched to.
    pub interface: &'static str,
    /// The linked-in type that builds its instances.
    pub plugin_type: Arc<dyn PluginType>,
}

impl Plugin {
    /// Configuration schema of the underlying type.
    pub fn params(&self) -> &'static [ConfigParam] {
        self.plugin_type.params()
    }

    /// Serializable summary for listings.
    pub fn summary(&self) -> PluginSummary {
        PluginSummary {
            class_name: self.class_name.clone(),
            unit: self.unit.clone(),
            interface: self.interface,
            symbol: self.plugin_type.symbol(),
            source: self.source.clone(),
            description: self.description.clone(),
        }
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("class_name", &self.class_name)
            .field("unit", &self.unit)
            .field("interface", &self.interface)
            .field("symbol", &self.plugin_type.symbol())
            .finish()
    }
}

/// Serializable view of a [`Plugin`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginSummary {
    /// Class name.
    pub class_name: String,
    /// Exporting unit.
    pub unit: String,
    /// Matched interface.
    pub interface: &'static str,
    /// Plugin type symbol.
    pub symbol: &'static str,
    /// Unit file.
    pub source: PathBuf,
    /// Description.
    pub description: String,
}

// =============================================================================
// Plugin Registry
// =============================================================================

/// Catalog of discovered plugins, indexed by class name and by interface.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// All plugins in discovery order.
    plugins: Vec<Arc<Plugin>>,
    by_name: HashMap<String, Arc<Plugin>>,
    by_interface: HashMap<&'static str, Vec<Arc<Plugin>>>,
}

impl PluginRegistry {
    /// Scan the plugin tree and build the indices.
    ///
    /// # Errors
    /// [`RigError::PluginLoadFailure`] on any unit that fails to load, or if
    /// the root itself is unusable.
    pub fn initialize(
        scanner: &UnitScanner,
        interfaces: &InterfaceCatalog,
        library: &DriverLibrary,
    ) -> RigResult<Self> {
        let mut registry = Self::default();

        for path in scanner.scan()? {
            registry.load_unit(&path, interfaces, library)?;
        }

        tracing::info!(
            root = %scanner.root().display(),
            plugins = registry.plugins.len(),
            "Plugin registry initialized"
        );
        Ok(registry)
    }

    fn load_unit(
        &mut self,
        path: &Path,
        interfaces: &InterfaceCatalog,
        library: &DriverLibrary,
    ) -> RigResult<()> {
        let manifest = UnitManifest::from_file(path).map_err(|e| RigError::PluginLoadFailure {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let unit = manifest.unit_name(path);

        // Resolve every symbol before touching the indices so a bad unit
        // leaves nothing half-registered.
        let mut resolved = Vec::with_capacity(manifest.exports.len());
        for export in &manifest.exports {
            let plugin_type =
                library
                    .resolve(&export.symbol)
                    .ok_or_else(|| RigError::PluginLoadFailure {
                        path: path.to_path_buf(),
                        message: format!(
                            "class '{}' exports unknown symbol '{}'",
                            export.class_name, export.symbol
                        ),
                    })?;
            resolved.push((export, plugin_type));
        }

        let mut registered = 0usize;
        for (export, plugin_type) in resolved {
            let Some(interface) = interfaces.first_match(plugin_type.operations()) else {
                tracing::debug!(
                    unit = %unit,
                    class_name = %export.class_name,
                    symbol = plugin_type.symbol(),
                    "Type satisfies no capability interface, skipping"
                );
                continue;
            };

            if let Some(existing) = self.by_name.get(&export.class_name) {
                tracing::warn!(
                    class_name = %export.class_name,
                    kept_unit = %existing.unit,
                    skipped_unit = %unit,
                    "Duplicate plugin class name, keeping first registration"
                );
                continue;
            }

            let plugin = Arc::new(Plugin {
                class_name: export.class_name.clone(),
                unit: unit.clone(),
                source: path.to_path_buf(),
                description: export.description.clone(),
                interface: interface.name,
                plugin_type,
            });
            self.by_name
                .insert(plugin.class_name.clone(), Arc::clone(&plugin));
            self.by_interface
                .entry(interface.name)
                .or_default()
                .push(Arc::clone(&plugin));
            self.plugins.push(plugin);
            registered += 1;
        }

        tracing::info!(
            unit = %unit,
            path = %path.display(),
            registered,
            "Loaded plugin unit"
        );
        Ok(())
    }

    /// Plugin by class name.
    pub fn get_plugin_by_class_name(&self, class_name: &str) -> Option<Arc<Plugin>> {
        self.by_name.get(class_name).cloned()
    }

    /// Plugins bound to `interface`, in discovery order. Unknown names yield
    /// an empty list.
    pub fn get_plugins_by_interface(&self, interface: &str) -> Vec<Arc<Plugin>> {
        self.by_interface
            .get(interface)
            .cloned()
            .unwrap_or_default()
    }

    /// Class names bound to `interface`, in discovery order.
    pub fn get_plugin_names_by_interface(&self, interface: &str) -> Vec<String> {
        self.by_interface
            .get(interface)
            .map(|plugins| plugins.iter().map(|p| p.class_name.clone()).collect())
            .unwrap_or_default()
    }

    /// All plugins in discovery order.
    pub fn plugins(&self) -> &[Arc<Plugin>] {
        &self.plugins
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True if no plugin was registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
