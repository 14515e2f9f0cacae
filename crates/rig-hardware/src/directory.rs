//! Device Directory
//!
//! In-memory store of the channels, equipment, and devices operators create.
//! The three indices are the single source of truth; an equipment refers to
//! its devices by [`DeviceId`] and a device refers back to its equipment by
//! [`EquipmentId`].
//!
//! # Creation
//!
//! Every `create_*` operation resolves everything it references and builds
//! the plugin instance before it touches an index, so a failed creation
//! leaves the directory exactly as it was. Plugin builds are awaited with no
//! lock held.
//!
//! # Locking
//!
//! Each index has its own `parking_lot::RwLock`. When more than one lock is
//! needed the devices index is taken before an equipment's device list; no
//! other nesting occurs.
//!
//! # Example
//!
//! ```rust,ignore
//! let channel = directory
//!     .create_channel("bus-1", "RS-485 lighting bus", "BenchSerial", config)
//!     .await?;
//! let equipment = directory
//!     .create_equipment("Lab lights", "Ceiling panels", channel.id)?;
//! let dimmer = directory
//!     .create_actuator(equipment.id, "dimmer", NewDevice::new("Panel A", "AcmeDimmer"))
//!     .await?;
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use rig_core::capabilities::{ChannelDriver, SensorDriver};
use rig_core::driver::{ActuatorDriver, PluginConfig, PluginInstance};
use rig_core::error::{DriverError, DriverErrorKind, EntityKind, RigError, RigResult};
use rig_core::id::{ChannelId, DeviceId, EquipmentId};
use rig_core::interface::{CapabilityInterface, CHANNEL_INTERFACE, SENSOR_INTERFACE};
use serde::{Deserialize, Serialize};

use crate::actuator::ActuatorTypeCatalog;
use crate::plugin::{Plugin, PluginRegistry};

// =============================================================================
// Entities
// =============================================================================

/// A configured communication binding, shared by any number of equipment.
pub struct Channel {
    /// Identifier.
    pub id: ChannelId,
    /// Short label.
    pub label: String,
    /// Free text.
    pub description: String,
    /// Plugin the driver was built from.
    pub plugin: Arc<Plugin>,
    /// Configuration the driver was built with.
    pub configuration: PluginConfig,
    /// Live driver.
    pub driver: Arc<dyn ChannelDriver>,
}

impl Channel {
    /// Serializable view.
    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            id: self.id,
            label: self.label.clone(),
            description: self.description.clone(),
            plugin: self.plugin.class_name.clone(),
            configuration: self.configuration.clone(),
            is_open: self.driver.is_open(),
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("plugin", &self.plugin.class_name)
            .finish()
    }
}

/// A logical grouping of devices sharing one channel.
pub struct Equipment {
    /// Identifier.
    pub id: EquipmentId,
    /// Short label.
    pub label: String,
    /// Free text.
    pub description: String,
    /// Shared channel.
    pub channel: Arc<Channel>,
    devices: RwLock<Vec<DeviceId>>,
}

impl Equipment {
    /// Owned devices, in creation order.
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().clone()
    }
}

impl std::fmt::Debug for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Equipment")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("channel", &self.channel.id)
            .field("devices", &*self.devices.read())
            .finish()
    }
}

/// What a device can do.
#[derive(Clone)]
pub enum DeviceKind {
    /// Produces readings.
    Sensor(Arc<dyn SensorDriver>),
    /// Accepts operations of its category.
    Actuator {
        /// Actuator category name.
        category: String,
        /// Built driver.
        driver: ActuatorDriver,
    },
}

/// A sensor or actuator owned by exactly one equipment.
pub struct Device {
    /// Identifier.
    pub id: DeviceId,
    /// Short label.
    pub label: String,
    /// Free text.
    pub description: String,
    /// Manufacturer.
    pub brand: String,
    /// Model designation.
    pub model: String,
    /// Plugin the driver was built from.
    pub plugin: Arc<Plugin>,
    /// Owning equipment.
    pub equipment_id: EquipmentId,
    /// Channel of the owning equipment.
    pub channel_id: ChannelId,
    /// Sensor or actuator driver.
    pub kind: DeviceKind,
}

impl Device {
    /// Actuator category, if this is an actuator.
    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            DeviceKind::Actuator { category, .. } => Some(category),
            DeviceKind::Sensor(_) => None,
        }
    }

    /// Actuator driver, if this is an actuator.
    pub fn as_actuator(&self) -> Option<&ActuatorDriver> {
        match &self.kind {
            DeviceKind::Actuator { driver, .. } => Some(driver),
            DeviceKind::Sensor(_) => None,
        }
    }

    /// Sensor driver, if this is a sensor.
    pub fn as_sensor(&self) -> Option<&Arc<dyn SensorDriver>> {
        match &self.kind {
            DeviceKind::Sensor(sensor) => Some(sensor),
            DeviceKind::Actuator { .. } => None,
        }
    }

    /// Serializable view.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            id: self.id,
            label: self.label.clone(),
            description: self.description.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            plugin: self.plugin.class_name.clone(),
            kind: match self.kind {
                DeviceKind::Sensor(_) => DeviceKindLabel::Sensor,
                DeviceKind::Actuator { .. } => DeviceKindLabel::Actuator,
            },
            category: self.category().map(str::to_string),
            equipment_id: self.equipment_id,
            channel_id: self.channel_id,
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("plugin", &self.plugin.class_name)
            .field("category", &self.category())
            .field("equipment_id", &self.equipment_id)
            .finish()
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// Serializable view of a [`Channel`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSnapshot {
    /// Identifier.
    pub id: ChannelId,
    /// Label.
    pub label: String,
    /// Description.
    pub description: String,
    /// Plugin class name.
    pub plugin: String,
    /// Configuration used to build the driver.
    pub configuration: PluginConfig,
    /// Whether the transport is open.
    pub is_open: bool,
}

/// Device variant tag in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKindLabel {
    /// Sensor.
    Sensor,
    /// Actuator.
    Actuator,
}

/// Serializable view of a [`Device`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    /// Identifier.
    pub id: DeviceId,
    /// Label.
    pub label: String,
    /// Description.
    pub description: String,
    /// Manufacturer.
    pub brand: String,
    /// Model.
    pub model: String,
    /// Plugin class name.
    pub plugin: String,
    /// Sensor or actuator.
    pub kind: DeviceKindLabel,
    /// Actuator category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Owning equipment.
    pub equipment_id: EquipmentId,
    /// Channel of the owning equipment.
    pub channel_id: ChannelId,
}

/// Serializable view of an [`Equipment`] and its devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentSnapshot {
    /// Identifier.
    pub id: EquipmentId,
    /// Label.
    pub label: String,
    /// Description.
    pub description: String,
    /// Shared channel.
    pub channel_id: ChannelId,
    /// Owned devices, in creation order.
    pub devices: Vec<DeviceSnapshot>,
}

// =============================================================================
// Creation Requests
// =============================================================================

/// Descriptive fields and plugin binding for a new sensor or actuator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDevice {
    /// Short label.
    pub label: String,
    /// Free text.
    pub description: String,
    /// Manufacturer.
    pub brand: String,
    /// Model designation.
    pub model: String,
    /// Plugin class to build the driver from.
    pub plugin_class_name: String,
    /// Plugin configuration.
    pub configuration: PluginConfig,
}

impl NewDevice {
    /// Request with a label and plugin class, everything else empty.
    pub fn new(label: impl Into<String>, plugin_class_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            plugin_class_name: plugin_class_name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set brand and model.
    pub fn with_model(mut self, brand: impl Into<String>, model: impl Into<String>) -> Self {
        self.brand = brand.into();
        self.model = model.into();
        self
    }

    /// Set the plugin configuration.
    pub fn with_configuration(mut self, configuration: PluginConfig) -> Self {
        self.configuration = configuration;
        self
    }
}

// =============================================================================
// Index
// =============================================================================

/// Id-keyed, insertion-ordered, append-only index.
struct Index<K, V> {
    by_id: HashMap<K, Arc<V>>,
    order: Vec<Arc<V>>,
}

impl<K: Eq + Hash, V> Index<K, V> {
    fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, id: K, value: Arc<V>) {
        self.by_id.insert(id, Arc::clone(&value));
        self.order.push(value);
    }

    fn get(&self, id: &K) -> Option<Arc<V>> {
        self.by_id.get(id).cloned()
    }
}

// =============================================================================
// Device Directory
// =============================================================================

/// Authoritative store of channels, equipment, and devices.
pub struct DeviceDirectory {
    plugins: Arc<PluginRegistry>,
    actuators: Arc<ActuatorTypeCatalog>,
    channels: RwLock<Index<ChannelId, Channel>>,
    equipments: RwLock<Index<EquipmentId, Equipment>>,
    devices: RwLock<Index<DeviceId, Device>>,
}

impl DeviceDirectory {
    /// Empty directory over a plugin registry and actuator catalog.
    pub fn new(plugins: Arc<PluginRegistry>, actuators: Arc<ActuatorTypeCatalog>) -> Self {
        Self {
            plugins,
            actuators,
            channels: RwLock::new(Index::new()),
            equipments: RwLock::new(Index::new()),
            devices: RwLock::new(Index::new()),
        }
    }

    fn resolve_plugin(&self, class_name: &str) -> RigResult<Arc<Plugin>> {
        self.plugins
            .get_plugin_by_class_name(class_name)
            .ok_or_else(|| RigError::not_found(EntityKind::Plugin, class_name))
    }

    fn resolve_equipment(&self, id: EquipmentId) -> RigResult<Arc<Equipment>> {
        self.equipments
            .read()
            .get(&id)
            .ok_or_else(|| RigError::not_found(EntityKind::Equipment, id))
    }

    /// Create and open a channel from a channel plugin.
    ///
    /// # Errors
    /// - `NotFound{Plugin}` for an unknown class name
    /// - `CapabilityMismatch` if the plugin is not a channel plugin
    /// - `InvalidConfiguration` if the plugin rejects `configuration`
    /// - `Driver` if building or opening the channel fails
    pub async fn create_channel(
        &self,
        label: impl Into<String>,
        description: impl Into<String>,
        plugin_class_name: &str,
        configuration: PluginConfig,
    ) -> RigResult<Arc<Channel>> {
        let plugin = self.resolve_plugin(plugin_class_name)?;
        require_interface(&plugin, &CHANNEL_INTERFACE)?;
        validate_configuration(&plugin, &configuration)?;

        let instance = build(&plugin, configuration.clone(), None).await?;
        let PluginInstance::Channel(driver) = instance else {
            return Err(mismatch(&plugin, &CHANNEL_INTERFACE));
        };
        driver.open().await.map_err(|e| {
            DriverError::from_anyhow(&plugin.class_name, DriverErrorKind::Communication, e)
        })?;

        let channel = Arc::new(Channel {
            id: ChannelId::new(),
            label: label.into(),
            description: description.into(),
            plugin,
            configuration,
            driver,
        });
        self.channels
            .write()
            .insert(channel.id, Arc::clone(&channel));

        tracing::info!(
            channel_id = %channel.id,
            class_name = %channel.plugin.class_name,
            label = %channel.label,
            "Created channel"
        );
        Ok(channel)
    }

    /// Create an equipment bound to an existing channel.
    ///
    /// # Errors
    /// `NotFound{Channel}` if `channel_id` is unknown.
    pub fn create_equipment(
        &self,
        label: impl Into<String>,
        description: impl Into<String>,
        channel_id: ChannelId,
    ) -> RigResult<Arc<Equipment>> {
        let channel = self
            .get_channel(channel_id)
            .ok_or_else(|| RigError::not_found(EntityKind::Channel, channel_id))?;

        let equipment = Arc::new(Equipment {
            id: EquipmentId::new(),
            label: label.into(),
            description: description.into(),
            channel,
            devices: RwLock::new(Vec::new()),
        });
        self.equipments
            .write()
            .insert(equipment.id, Arc::clone(&equipment));

        tracing::info!(
            equipment_id = %equipment.id,
            channel_id = %channel_id,
            label = %equipment.label,
            "Created equipment"
        );
        Ok(equipment)
    }

    /// Create a sensor on an equipment, using the equipment's channel.
    ///
    /// # Errors
    /// - `NotFound{Equipment}` or `NotFound{Plugin}`
    /// - `CapabilityMismatch` if the plugin is not a sensor plugin or builds
    ///   something else
    /// - `InvalidConfiguration`, `Driver`
    pub async fn create_sensor(
        &self,
        equipment_id: EquipmentId,
        request: NewDevice,
    ) -> RigResult<Arc<Device>> {
        let equipment = self.resolve_equipment(equipment_id)?;
        let plugin = self.resolve_plugin(&request.plugin_class_name)?;
        require_interface(&plugin, &SENSOR_INTERFACE)?;
        validate_configuration(&plugin, &request.configuration)?;

        let channel = Arc::clone(&equipment.channel.driver);
        let instance = build(&plugin, request.configuration.clone(), Some(channel)).await?;
        let PluginInstance::Sensor(sensor) = instance else {
            return Err(mismatch(&plugin, &SENSOR_INTERFACE));
        };

        Ok(self.commit_device(&equipment, plugin, request, DeviceKind::Sensor(sensor)))
    }

    /// Create an actuator of `category` on an equipment.
    ///
    /// Construction is delegated to [`ActuatorTypeCatalog::create`] with the
    /// equipment's channel.
    ///
    /// # Errors
    /// - `NotFound{Equipment}` or `NotFound{Plugin}`
    /// - `UnknownCategory`, `CapabilityMismatch`, `InvalidConfiguration`,
    ///   `Driver` from the catalog
    pub async fn create_actuator(
        &self,
        equipment_id: EquipmentId,
        category: &str,
        request: NewDevice,
    ) -> RigResult<Arc<Device>> {
        let equipment = self.resolve_equipment(equipment_id)?;
        let plugin = self.resolve_plugin(&request.plugin_class_name)?;

        let driver = self
            .actuators
            .create(
                category,
                &plugin,
                request.configuration.clone(),
                Arc::clone(&equipment.channel.driver),
            )
            .await?;

        let kind = DeviceKind::Actuator {
            category: category.to_string(),
            driver,
        };
        Ok(self.commit_device(&equipment, plugin, request, kind))
    }

    fn commit_device(
        &self,
        equipment: &Arc<Equipment>,
        plugin: Arc<Plugin>,
        request: NewDevice,
        kind: DeviceKind,
    ) -> Arc<Device> {
        let device = Arc::new(Device {
            id: DeviceId::new(),
            label: request.label,
            description: request.description,
            brand: request.brand,
            model: request.model,
            plugin,
            equipment_id: equipment.id,
            channel_id: equipment.channel.id,
            kind,
        });

        {
            let mut devices = self.devices.write();
            devices.insert(device.id, Arc::clone(&device));
            equipment.devices.write().push(device.id);
        }

        tracing::info!(
            device_id = %device.id,
            equipment_id = %equipment.id,
            class_name = %device.plugin.class_name,
            category = device.category().unwrap_or("sensor"),
            "Created device"
        );
        device
    }

    /// Channel by id.
    pub fn get_channel(&self, id: ChannelId) -> Option<Arc<Channel>> {
        self.channels.read().get(&id)
    }

    /// Equipment by id.
    pub fn get_equipment(&self, id: EquipmentId) -> Option<Arc<Equipment>> {
        self.equipments.read().get(&id)
    }

    /// Device by id.
    pub fn get_device(&self, id: DeviceId) -> Option<Arc<Device>> {
        self.devices.read().get(&id)
    }

    /// All channels, in creation order.
    pub fn list_channels(&self) -> Vec<ChannelSnapshot> {
        let channels = self.channels.read().order.clone();
        channels.iter().map(|c| c.snapshot()).collect()
    }

    /// Snapshot of one equipment and its devices.
    pub fn equipment_snapshot(&self, id: EquipmentId) -> Option<EquipmentSnapshot> {
        self.get_equipment(id).map(|e| self.snapshot_of(&e))
    }

    /// All equipment with their devices, in creation order.
    pub fn list_equipments(&self) -> Vec<EquipmentSnapshot> {
        let equipments = self.equipments.read().order.clone();
        equipments.iter().map(|e| self.snapshot_of(e)).collect()
    }

    fn snapshot_of(&self, equipment: &Equipment) -> EquipmentSnapshot {
        // Copy ids out first; the devices index is never locked under an
        // equipment's device list.
        let ids = equipment.device_ids();
        let devices = {
            let index = self.devices.read();
            ids.iter()
                .filter_map(|id| index.get(id))
                .map(|d| d.snapshot())
                .collect()
        };
        EquipmentSnapshot {
            id: equipment.id,
            label: equipment.label.clone(),
            description: equipment.description.clone(),
            channel_id: equipment.channel.id,
            devices,
        }
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.read().order.len()
    }

    /// Number of equipment.
    pub fn equipment_count(&self) -> usize {
        self.equipments.read().order.len()
    }

    /// Number of devices.
    pub fn device_count(&self) -> usize {
        self.devices.read().order.len()
    }
}

impl std::fmt::Debug for DeviceDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceDirectory")
            .field("channels", &self.channel_count())
            .field("equipments", &self.equipment_count())
            .field("devices", &self.device_count())
            .finish()
    }
}

fn mismatch(plugin: &Plugin, required: &CapabilityInterface) -> RigError {
    RigError::CapabilityMismatch {
        plugin: plugin.class_name.clone(),
        required: required.name.to_string(),
    }
}

fn require_interface(plugin: &Plugin, required: &CapabilityInterface) -> RigResult<()> {
    if required.is_satisfied_by(plugin.plugin_type.operations()) {
        Ok(())
    } else {
        Err(mismatch(plugin, required))
    }
}

fn validate_configuration(plugin: &Plugin, configuration: &PluginConfig) -> RigResult<()> {
    plugin
        .plugin_type
        .validate(configuration)
        .map_err(|e| RigError::InvalidConfiguration {
            plugin: plugin.class_name.clone(),
            reason: format!("{:#}", e),
        })
}

async fn build(
    plugin: &Plugin,
    configuration: PluginConfig,
    channel: Option<Arc<dyn ChannelDriver>>,
) -> RigResult<PluginInstance> {
    plugin
        .plugin_type
        .build(configuration, channel)
        .await
        .map_err(|e| {
            DriverError::from_anyhow(&plugin.class_name, DriverErrorKind::Initialization, e).into()
        })
}
