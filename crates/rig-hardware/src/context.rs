//! Process-wide hardware context.
//!
//! [`HardwareContext`] is built once at startup, before any request is
//! served, and then passed to whoever needs it. It owns the interface
//! catalog, the plugin registry, the actuator catalog, the device directory,
//! and the dispatcher, and exposes the read-only introspection surface.
//!
//! ```rust,ignore
//! let settings = RigSettings::load()?;
//! let mut library = DriverLibrary::new();
//! rig_driver_mock::register_all(&mut library)?;
//!
//! let context = HardwareContext::initialize(&settings.plugins, &library)?;
//! println!("{:?}", context.plugin_names_by_category("dimmer"));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use rig_core::driver::{ConfigParam, DriverLibrary};
use rig_core::error::{EntityKind, RigError, RigResult};
use rig_core::interface::{InterfaceCatalog, ParamSpec};

use crate::actuator::ActuatorTypeCatalog;
use crate::config::PluginSettings;
use crate::directory::DeviceDirectory;
use crate::dispatch::OperationDispatcher;
use crate::plugin::{PluginRegistry, UnitScanner};

/// Everything the rig needs at runtime, built once.
#[derive(Debug, Clone)]
pub struct HardwareContext {
    interfaces: Arc<InterfaceCatalog>,
    plugins: Arc<PluginRegistry>,
    actuators: Arc<ActuatorTypeCatalog>,
    directory: Arc<DeviceDirectory>,
    dispatcher: OperationDispatcher,
}

impl HardwareContext {
    /// Build the context with the standard actuator categories.
    ///
    /// Scans the plugin tree synchronously; a unit that fails to load aborts
    /// with [`RigError::PluginLoadFailure`].
    pub fn initialize(settings: &PluginSettings, library: &DriverLibrary) -> RigResult<Self> {
        Self::with_catalog(&settings.scanner(), library, ActuatorTypeCatalog::standard())
    }

    /// Build the context with a custom scanner and actuator catalog.
    pub fn with_catalog(
        scanner: &UnitScanner,
        library: &DriverLibrary,
        actuators: ActuatorTypeCatalog,
    ) -> RigResult<Self> {
        let interfaces = Arc::new(InterfaceCatalog::new(actuators.required_interfaces()));
        let plugins = Arc::new(PluginRegistry::initialize(scanner, &interfaces, library)?);
        let actuators = Arc::new(actuators);
        let directory = Arc::new(DeviceDirectory::new(
            Arc::clone(&plugins),
            Arc::clone(&actuators),
        ));
        let dispatcher = OperationDispatcher::new(Arc::clone(&directory), Arc::clone(&actuators));

        tracing::info!(
            interfaces = interfaces.len(),
            plugins = plugins.len(),
            categories = actuators.categories().len(),
            "Hardware context initialized"
        );

        Ok(Self {
            interfaces,
            plugins,
            actuators,
            directory,
            dispatcher,
        })
    }

    /// Interface catalog.
    pub fn interfaces(&self) -> &InterfaceCatalog {
        &self.interfaces
    }

    /// Plugin registry.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Actuator catalog.
    pub fn actuators(&self) -> &ActuatorTypeCatalog {
        &self.actuators
    }

    /// Device directory.
    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    /// Operation dispatcher.
    pub fn dispatcher(&self) -> &OperationDispatcher {
        &self.dispatcher
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Interface names in matching order.
    pub fn interface_names(&self) -> Vec<&'static str> {
        self.interfaces.names()
    }

    /// Class names of plugins bound to `interface`.
    pub fn plugin_names_by_interface(&self, interface: &str) -> Vec<String> {
        self.plugins.get_plugin_names_by_interface(interface)
    }

    /// Class names of plugins able to drive actuator `category`.
    ///
    /// Unknown categories yield an empty list.
    pub fn plugin_names_by_category(&self, category: &str) -> Vec<String> {
        self.actuators
            .get(category)
            .map(|c| self.plugin_names_by_interface(c.required_interface.name))
            .unwrap_or_default()
    }

    /// Configuration parameters of plugin `class_name`, as name to description.
    pub fn plugin_configuration_params(
        &self,
        class_name: &str,
    ) -> RigResult<BTreeMap<&'static str, &'static str>> {
        self.plugins
            .get_plugin_by_class_name(class_name)
            .map(|p| {
                p.params()
                    .iter()
                    .map(|param: &ConfigParam| (param.name, param.description))
                    .collect()
            })
            .ok_or_else(|| RigError::not_found(EntityKind::Plugin, class_name))
    }

    /// Operation schema of actuator `category`.
    pub fn list_operations(
        &self,
        category: &str,
    ) -> RigResult<BTreeMap<&'static str, &'static [ParamSpec]>> {
        self.dispatcher.list_operations(category)
    }
}
