//! `rig-core`
//!
//! Core trait definitions and types for rig, the capability-based equipment
//! control system.
//!
//! This crate holds everything that plugin drivers and the hardware layer
//! agree on, and nothing that depends on how plugins are discovered or how
//! devices are stored.
//!
//! ## Key Types
//!
//! - [`capabilities`]: async driver traits (`ChannelDriver`, `SensorDriver`,
//!   and one trait per actuator shape)
//! - [`interface`]: [`CapabilityInterface`] contracts and the ordered
//!   [`InterfaceCatalog`] plugins are matched against
//! - [`driver`]: the [`PluginType`] trait, the [`PluginInstance`] it builds,
//!   and the [`DriverLibrary`] of linked-in types
//! - [`parameter`]: schema-checked [`OperationArgs`] for operation dispatch
//! - [`id`]: typed UUID identifiers
//! - [`error`]: [`RigError`] and [`DriverError`]

pub mod capabilities;
pub mod driver;
pub mod error;
pub mod id;
pub mod interface;
pub mod parameter;

pub use capabilities::Reading;
pub use driver::{
    ActuatorDriver, ActuatorShape, ConfigParam, DriverLibrary, PluginConfig, PluginInstance,
    PluginType,
};
pub use error::{DriverError, DriverErrorKind, EntityKind, RigError, RigResult};
pub use id::{ChannelId, DeviceId, EquipmentId};
pub use interface::{CapabilityInterface, InterfaceCatalog, OperationSpec, ParamSpec, ParamType};
pub use parameter::{OperationArgs, ParamValue};
