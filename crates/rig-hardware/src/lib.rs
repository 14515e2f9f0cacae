//! `rig-hardware`
//!
//! Plugin discovery, actuator categories, the device directory, and
//! operation dispatch.
//!
//! ```text
//! PluginRegistry ──► ActuatorTypeCatalog ──► DeviceDirectory ──► OperationDispatcher
//!       ▲                                                             │
//!       └──────────────── HardwareContext (built once) ◄──────────────┘
//! ```

pub mod actuator;
pub mod config;
pub mod context;
pub mod directory;
pub mod dispatch;
pub mod plugin;

pub use actuator::{ActuatorCategory, ActuatorTypeCatalog};
pub use config::RigSettings;
pub use context::HardwareContext;
pub use directory::{
    Channel, ChannelSnapshot, Device, DeviceDirectory, DeviceKind, DeviceSnapshot, Equipment,
    EquipmentSnapshot, NewDevice,
};
pub use dispatch::OperationDispatcher;
pub use plugin::{Plugin, PluginRegistry, PluginSummary, UnitScanner};
