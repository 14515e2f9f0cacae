//! Error types for the equipment control core.
//!
//! This module defines `RigError`, the error type returned by every catalog,
//! directory, and dispatch operation, and `DriverError`, the structured error
//! used when a plugin driver itself fails.
//!
//! ## Error Hierarchy
//!
//! - **Lookup failures** (`NotFound`): a referenced channel, equipment, device,
//!   or plugin does not exist. Recoverable; the caller decides how to react.
//! - **Binding failures** (`UnknownCategory`, `CapabilityMismatch`,
//!   `InvalidConfiguration`): a creation request names something that exists
//!   but cannot be combined as asked.
//! - **Dispatch failures** (`NotAnActuator`, `NotASensor`, `UnknownOperation`,
//!   `InvalidParameters`): an operation request does not fit the target device.
//! - **Startup failures** (`PluginLoadFailure`, `Configuration`): the plugin
//!   tree or the seed tables are inconsistent. `PluginLoadFailure` is fatal and
//!   aborts startup.
//! - **Driver failures** (`Driver`): the plugin accepted the call but the
//!   hardware side failed.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Driver Errors
// =============================================================================

/// Category of a driver-side failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// Driver could not be constructed.
    Initialization,
    /// Driver rejected its configuration.
    Configuration,
    /// Transport-level failure (channel closed, garbled response).
    Communication,
    /// Device reported a fault.
    Hardware,
    /// Device did not answer in time.
    Timeout,
    /// Value outside the range the device accepts.
    InvalidParameter,
    /// Anything else.
    Unknown,
}

impl std::fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DriverErrorKind::Initialization => "initialization",
            DriverErrorKind::Configuration => "configuration",
            DriverErrorKind::Communication => "communication",
            DriverErrorKind::Hardware => "hardware",
            DriverErrorKind::Timeout => "timeout",
            DriverErrorKind::InvalidParameter => "invalid_parameter",
            DriverErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Structured error raised by a plugin driver.
#[derive(Error, Debug, Clone)]
#[error("Driver '{driver}' {kind} error: {message}")]
pub struct DriverError {
    /// Class name (or symbol) of the failing plugin.
    pub driver: String,
    /// Failure category.
    pub kind: DriverErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl DriverError {
    /// Create a new driver error.
    pub fn new(
        driver: impl Into<String>,
        kind: DriverErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            driver: driver.into(),
            kind,
            message: message.into(),
        }
    }

    /// Wrap an `anyhow` error coming back from a capability call.
    pub fn from_anyhow(driver: impl Into<String>, kind: DriverErrorKind, err: anyhow::Error) -> Self {
        Self::new(driver, kind, format!("{:#}", err))
    }
}

// =============================================================================
// Entity Kinds
// =============================================================================

/// Kind of entity named in a [`RigError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A communication channel.
    Channel,
    /// An equipment grouping.
    Equipment,
    /// A sensor or actuator.
    Device,
    /// A registered plugin class.
    Plugin,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Channel => "Channel",
            EntityKind::Equipment => "Equipment",
            EntityKind::Device => "Device",
            EntityKind::Plugin => "Plugin",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Rig Errors
// =============================================================================

/// Convenience alias for results using the core error type.
pub type RigResult<T> = std::result::Result<T, RigError>;

/// Primary error type for catalog, directory, and dispatch operations.
///
/// # Example
///
/// ```rust
/// use rig_core::error::{EntityKind, RigError};
///
/// let err = RigError::not_found(EntityKind::Plugin, "AcmeDimmer");
/// assert!(err.is_not_found(EntityKind::Plugin));
/// assert_eq!(err.to_string(), "Plugin 'AcmeDimmer' not found");
/// ```
#[derive(Error, Debug)]
pub enum RigError {
    /// A referenced entity does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The identifier or class name that was looked up.
        id: String,
    },

    /// The actuator category name is not registered.
    #[error("Unknown actuator category '{0}'")]
    UnknownCategory(String),

    /// The plugin does not provide the capability the caller requires.
    #[error("Plugin '{plugin}' does not satisfy capability interface '{required}'")]
    CapabilityMismatch {
        /// Plugin class name.
        plugin: String,
        /// Interface the plugin was expected to satisfy.
        required: String,
    },

    /// The device's category declares no operation with this name.
    #[error("Device '{device}' has no operation '{operation}'")]
    UnknownOperation {
        /// Target device identifier.
        device: String,
        /// Requested operation name.
        operation: String,
    },

    /// Supplied keyword parameters do not match the declared schema.
    #[error("Invalid parameters for operation '{operation}': {reason}")]
    InvalidParameters {
        /// Operation whose schema was violated.
        operation: String,
        /// First violation found.
        reason: String,
    },

    /// Operation dispatch targeted a device that is not an actuator.
    #[error("Device '{0}' is not an actuator")]
    NotAnActuator(String),

    /// A sensor read targeted a device that is not a sensor.
    #[error("Device '{0}' is not a sensor")]
    NotASensor(String),

    /// A plugin rejected the configuration it was given.
    #[error("Invalid configuration for plugin '{plugin}': {reason}")]
    InvalidConfiguration {
        /// Plugin class name.
        plugin: String,
        /// Validation message from the plugin type.
        reason: String,
    },

    /// A plugin unit could not be loaded. Fatal during startup.
    #[error("Failed to load plugin unit {}: {message}", path.display())]
    PluginLoadFailure {
        /// Unit (or root) path that failed.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Seed tables or settings are inconsistent.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// The plugin driver failed while executing a call.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl RigError {
    /// Shorthand for [`RigError::NotFound`].
    pub fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        RigError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// True if this is a `NotFound` for the given kind.
    pub fn is_not_found(&self, expected: EntityKind) -> bool {
        matches!(self, RigError::NotFound { kind, .. } if *kind == expected)
    }

    /// True for errors that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RigError::PluginLoadFailure { .. })
    }
}
