//! Mock positioning motor implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use rig_core::capabilities::{ChannelDriver, MotorDriver};
use rig_core::driver::{
    parse_config, ActuatorDriver, ConfigParam, PluginConfig, PluginInstance, PluginType,
};
use rig_core::interface::{OperationSpec, MOTOR_INTERFACE};
use serde::Deserialize;
use tokio::time::Duration;

use crate::common::{require_channel, MockBehavior, MockMode, TimingConfig};

/// Symbol exported by plugin units.
pub const SYMBOL: &str = "mock.motor";

// =============================================================================
// MockMotorType - PluginType implementation
// =============================================================================

/// Configuration for [`MockMotor`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockMotorConfig {
    /// Axis number on the controller (default: 1)
    #[serde(default = "default_axis")]
    pub axis: u8,

    /// Initial position in mm (default: 0.0)
    #[serde(default)]
    pub initial_position: f64,

    /// Lower travel limit in mm (default: 0.0)
    #[serde(default)]
    pub min_position: f64,

    /// Upper travel limit in mm (default: 100.0)
    #[serde(default = "default_max")]
    pub max_position: f64,

    /// Motion speed in mm/sec (default: 10.0)
    #[serde(default = "default_speed")]
    pub speed_mm_per_sec: f64,

    /// Simulation mode
    #[serde(default)]
    pub mode: MockMode,

    /// Failure probability per operation in chaos mode
    #[serde(default)]
    pub failure_rate: f64,

    /// RNG seed for reproducible chaos
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_axis() -> u8 {
    1
}

fn default_max() -> f64 {
    100.0
}

fn default_speed() -> f64 {
    10.0
}

/// Largest accepted travel limit magnitude in mm.
pub const MAX_TRAVEL_MM: f64 = 1.0e6;

/// Slowest accepted motion speed in mm/sec.
pub const MIN_SPEED_MM_PER_SEC: f64 = 1.0e-3;

impl MockMotorConfig {
    fn check(&self) -> Result<()> {
        for (name, value) in [
            ("initial_position", self.initial_position),
            ("min_position", self.min_position),
            ("max_position", self.max_position),
        ] {
            if !value.is_finite() || value.abs() > MAX_TRAVEL_MM {
                anyhow::bail!("{} must be finite and within ±{} mm, got {}", name, MAX_TRAVEL_MM, value);
            }
        }
        if self.min_position >= self.max_position {
            anyhow::bail!(
                "min_position {} must be below max_position {}",
                self.min_position,
                self.max_position
            );
        }
        if !(self.min_position..=self.max_position).contains(&self.initial_position) {
            anyhow::bail!("initial_position {} outside travel limits", self.initial_position);
        }
        if !self.speed_mm_per_sec.is_finite() || self.speed_mm_per_sec < MIN_SPEED_MM_PER_SEC {
            anyhow::bail!(
                "speed_mm_per_sec must be finite and at least {}, got {}",
                MIN_SPEED_MM_PER_SEC,
                self.speed_mm_per_sec
            );
        }
        Ok(())
    }
}

static PARAMS: &[ConfigParam] = &[
    ConfigParam::new("axis", "Controller axis number (default 1)"),
    ConfigParam::new("initial_position", "Position at power-up in mm"),
    ConfigParam::new("min_position", "Lower travel limit in mm"),
    ConfigParam::new("max_position", "Upper travel limit in mm"),
    ConfigParam::new("speed_mm_per_sec", "Travel speed used for realistic timing"),
    ConfigParam::new("mode", "instant | realistic | chaos"),
    ConfigParam::new("failure_rate", "Failure probability per operation in chaos mode"),
    ConfigParam::new("seed", "RNG seed for reproducible chaos"),
];

/// Plugin type for [`MockMotor`].
pub struct MockMotorType;

impl PluginType for MockMotorType {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn name(&self) -> &'static str {
        "Mock Motor"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        MOTOR_INTERFACE.operations
    }

    fn params(&self) -> &'static [ConfigParam] {
        PARAMS
    }

    fn validate(&self, config: &PluginConfig) -> Result<()> {
        parse_config::<MockMotorConfig>(config)?.check()
    }

    fn build(
        &self,
        config: PluginConfig,
        channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async move {
            let cfg: MockMotorConfig = parse_config(&config)?;
            cfg.check()?;
            let channel = require_channel(SYMBOL, channel)?;
            let motor = Arc::new(MockMotor::with_config(channel, cfg));
            Ok(PluginInstance::Actuator(ActuatorDriver::Motor(motor)))
        })
    }
}

// =============================================================================
// MockMotor
// =============================================================================

/// Simulated linear motor with hard travel limits.
///
/// In realistic mode a move takes `distance / speed` plus settling time;
/// `stop()` during that window leaves the motor where it started.
pub struct MockMotor {
    channel: Arc<dyn ChannelDriver>,
    axis: u8,
    position: Mutex<f64>,
    min_position: f64,
    max_position: f64,
    speed_mm_per_sec: f64,
    stop_requested: AtomicBool,
    behavior: MockBehavior,
}

impl MockMotor {
    /// Instant-mode motor with default limits (0 to 100 mm).
    pub fn new(channel: Arc<dyn ChannelDriver>, axis: u8) -> Self {
        Self {
            channel,
            axis,
            position: Mutex::new(0.0),
            min_position: 0.0,
            max_position: default_max(),
            speed_mm_per_sec: default_speed(),
            stop_requested: AtomicBool::new(false),
            behavior: MockBehavior::instant(),
        }
    }

    /// Motor from parsed configuration.
    pub fn with_config(channel: Arc<dyn ChannelDriver>, cfg: MockMotorConfig) -> Self {
        Self {
            channel,
            axis: cfg.axis,
            position: Mutex::new(cfg.initial_position),
            min_position: cfg.min_position,
            max_position: cfg.max_position,
            speed_mm_per_sec: cfg.speed_mm_per_sec,
            stop_requested: AtomicBool::new(false),
            behavior: MockBehavior::new(cfg.mode, cfg.failure_rate, cfg.seed, TimingConfig::motor()),
        }
    }

    /// Travel limits `(min, max)` in mm.
    pub fn limits(&self) -> (f64, f64) {
        (self.min_position, self.max_position)
    }

    fn travel_time(&self, distance: f64) -> Result<Duration> {
        let secs = distance.abs() / self.speed_mm_per_sec;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| anyhow!("travel time of {}s for {}mm is not representable: {}", secs, distance, e))
    }
}

#[async_trait]
impl MotorDriver for MockMotor {
    async fn move_to(&self, target: f64) -> Result<()> {
        if !(self.min_position..=self.max_position).contains(&target) {
            return Err(anyhow!(
                "Position {:.2}mm exceeds limits [{:.2}, {:.2}]mm",
                target,
                self.min_position,
                self.max_position
            ));
        }
        let start = *self.position.lock();
        let travel = self.travel_time(target - start)?;
        self.behavior.begin(SYMBOL, "move_to").await?;
        self.channel
            .transact(&format!("MOVE {} {:.3}", self.axis, target))
            .await?;

        self.stop_requested.store(false, Ordering::SeqCst);
        tracing::debug!(axis = self.axis, from = start, to = target, "MockMotor: moving");

        self.behavior.mode.pause(travel).await;
        if self.stop_requested.swap(false, Ordering::SeqCst) {
            tracing::debug!(axis = self.axis, "MockMotor: move aborted by stop");
            return Ok(());
        }

        *self.position.lock() = target;
        self.behavior.settle().await;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.channel.transact(&format!("STOP {}", self.axis)).await?;
        tracing::debug!(axis = self.axis, "MockMotor: stop");
        Ok(())
    }

    async fn position(&self) -> Result<f64> {
        self.behavior.errors.check_operation(SYMBOL, "position")?;
        Ok(*self.position.lock())
    }
}
