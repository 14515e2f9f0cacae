//! Atomic Hardware Capabilities
//!
//! This module defines the capability traits a plugin driver implements.
//! Each trait covers one kind of device the rig can drive:
//!
//! - [`ChannelDriver`]: a communication binding (serial line, bus, socket)
//! - [`SensorDriver`]: something that produces a [`Reading`]
//! - [`SwitchDriver`], [`DimmerDriver`], [`ValveDriver`], [`MotorDriver`]:
//!   one trait per actuator shape
//!
//! # Design Philosophy
//!
//! Each capability trait:
//! - Is async (uses #[async_trait])
//! - Is thread-safe (requires Send + Sync)
//! - Uses anyhow::Result for errors
//! - Focuses on ONE device shape
//!
//! Drivers receive their channel at build time (see
//! [`PluginType::build`](crate::driver::PluginType::build)) and talk to the
//! hardware through it; the traits below never mention transport details.
//!
//! # Example
//!
//! ```rust,ignore
//! struct BenchDimmer {
//!     channel: Arc<dyn ChannelDriver>,
//!     level: AtomicI64,
//! }
//!
//! #[async_trait]
//! impl DimmerDriver for BenchDimmer {
//!     async fn set_level(&self, level: i64) -> Result<()> {
//!         self.channel.transact(&format!("LVL {level}")).await?;
//!         self.level.store(level, Ordering::SeqCst);
//!         Ok(())
//!     }
//!
//!     async fn level(&self) -> Result<i64> {
//!         Ok(self.level.load(Ordering::SeqCst))
//!     }
//!
//!     async fn turn_off(&self) -> Result<()> {
//!         self.set_level(0).await
//!     }
//! }
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Readings
// =============================================================================

/// A single scalar measurement returned by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Measured value in `unit`.
    pub value: f64,
    /// Unit label (e.g. "degC", "%RH", "W").
    pub unit: String,
}

impl Reading {
    /// Create a reading.
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

// =============================================================================
// Channel
// =============================================================================

/// Capability: Communication Channel
///
/// A channel is the transport that equipment shares. It is created once and
/// then handed to every sensor and actuator built on that equipment.
///
/// # Contract
/// - `open()` and `close()` are idempotent
/// - `transact()` on a closed channel returns an error
/// - One request yields exactly one response line
#[async_trait]
pub trait ChannelDriver: Send + Sync {
    /// Open the underlying transport.
    async fn open(&self) -> Result<()>;

    /// Close the underlying transport.
    async fn close(&self) -> Result<()>;

    /// Send a request and wait for the matching response.
    ///
    /// # Arguments
    /// * `request` - Command string without line terminator
    async fn transact(&self, request: &str) -> Result<String>;

    /// Whether the transport is currently open.
    fn is_open(&self) -> bool;
}

// =============================================================================
// Sensor
// =============================================================================

/// Capability: Sensor
///
/// Devices that produce a scalar measurement on demand
/// (thermometers, hygrometers, power meters).
#[async_trait]
pub trait SensorDriver: Send + Sync {
    /// Take a measurement.
    ///
    /// # Returns
    /// - Ok(reading) on successful read
    /// - Err on hardware error or timeout
    async fn read(&self) -> Result<Reading>;
}

// =============================================================================
// Actuators
// =============================================================================

/// Capability: Switch
///
/// Two-state actuators (relays, contactors, smart plugs).
#[async_trait]
pub trait SwitchDriver: Send + Sync {
    /// Energize the output.
    async fn turn_on(&self) -> Result<()>;

    /// De-energize the output.
    async fn turn_off(&self) -> Result<()>;

    /// Current output state.
    async fn is_on(&self) -> Result<bool>;
}

/// Capability: Dimmer
///
/// Actuators with an integer output level (lighting dimmers, PWM drivers).
///
/// # Contract
/// - Level is a percentage in `0..=100`
/// - Implementations reject out-of-range levels instead of clamping
#[async_trait]
pub trait DimmerDriver: Send + Sync {
    /// Set the output level.
    ///
    /// # Arguments
    /// * `level` - Target level, 0 (off) to 100 (full)
    async fn set_level(&self, level: i64) -> Result<()>;

    /// Last level written to the device.
    async fn level(&self) -> Result<i64>;

    /// Shortcut for `set_level(0)`.
    async fn turn_off(&self) -> Result<()>;
}

/// Capability: Valve
///
/// Flow-control actuators with an opening position.
///
/// # Contract
/// - Position is a percentage in `0.0..=100.0`
/// - `open()` is equivalent to position 100, `close()` to position 0
#[async_trait]
pub trait ValveDriver: Send + Sync {
    /// Fully open.
    async fn open(&self) -> Result<()>;

    /// Fully close.
    async fn close(&self) -> Result<()>;

    /// Move to a partial opening.
    async fn set_position(&self, percent: f64) -> Result<()>;

    /// Current opening in percent.
    async fn position(&self) -> Result<f64>;
}

/// Capability: Motor
///
/// Positioning actuators (linear stages, blinds, rotary drives).
#[async_trait]
pub trait MotorDriver: Send + Sync {
    /// Move to an absolute position in device-native units.
    ///
    /// Returns once the motion is complete or fails.
    async fn move_to(&self, position: f64) -> Result<()>;

    /// Halt any motion in progress.
    async fn stop(&self) -> Result<()>;

    /// Current position in device-native units.
    async fn position(&self) -> Result<f64>;
}
