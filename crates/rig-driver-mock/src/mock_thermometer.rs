//! Mock thermometer implementation.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use rig_core::capabilities::{ChannelDriver, Reading, SensorDriver};
use rig_core::driver::{parse_config, ConfigParam, PluginConfig, PluginInstance, PluginType};
use rig_core::interface::{OperationSpec, SENSOR_INTERFACE};
use serde::Deserialize;

use crate::common::{require_channel, MockBehavior, MockMode, MockRng, TimingConfig};

/// Symbol exported by plugin units.
pub const SYMBOL: &str = "mock.thermometer";

/// Configuration for [`MockThermometer`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockThermometerConfig {
    /// Baseline temperature in °C (default: 21.0)
    #[serde(default = "default_base")]
    pub base_celsius: f64,

    /// Peak noise amplitude in °C (default: 0.0)
    #[serde(default)]
    pub noise: f64,

    /// Simulation mode
    #[serde(default)]
    pub mode: MockMode,

    /// Failure probability per read in chaos mode
    #[serde(default)]
    pub failure_rate: f64,

    /// RNG seed for noise and chaos
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_base() -> f64 {
    21.0
}

/// Largest accepted noise amplitude in °C.
pub const MAX_NOISE: f64 = 1.0e6;

/// Largest accepted baseline magnitude in °C.
pub const MAX_BASE_CELSIUS: f64 = 1.0e9;

impl MockThermometerConfig {
    fn check(&self) -> Result<()> {
        if !self.base_celsius.is_finite() || self.base_celsius.abs() > MAX_BASE_CELSIUS {
            anyhow::bail!(
                "base_celsius must be finite and within ±{}, got {}",
                MAX_BASE_CELSIUS,
                self.base_celsius
            );
        }
        if !(0.0..=MAX_NOISE).contains(&self.noise) {
            anyhow::bail!("noise must lie in 0..={}, got {}", MAX_NOISE, self.noise);
        }
        Ok(())
    }
}

static PARAMS: &[ConfigParam] = &[
    ConfigParam::new("base_celsius", "Baseline temperature in degrees Celsius"),
    ConfigParam::new("noise", "Peak noise amplitude in degrees Celsius"),
    ConfigParam::new("mode", "instant | realistic | chaos"),
    ConfigParam::new("failure_rate", "Failure probability per read in chaos mode"),
    ConfigParam::new("seed", "RNG seed for noise and chaos"),
];

/// Plugin type for [`MockThermometer`].
pub struct MockThermometerType;

impl PluginType for MockThermometerType {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn name(&self) -> &'static str {
        "Mock Thermometer"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        SENSOR_INTERFACE.operations
    }

    fn params(&self) -> &'static [ConfigParam] {
        PARAMS
    }

    fn validate(&self, config: &PluginConfig) -> Result<()> {
        parse_config::<MockThermometerConfig>(config)?.check()
    }

    fn build(
        &self,
        config: PluginConfig,
        channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async move {
            let cfg: MockThermometerConfig = parse_config(&config)?;
            cfg.check()?;
            let channel = require_channel(SYMBOL, channel)?;
            Ok(PluginInstance::Sensor(Arc::new(MockThermometer::with_config(channel, cfg))))
        })
    }
}

/// Simulated thermometer.
///
/// Each read issues `MEAS:TEMP?` on the equipment channel and reports the
/// baseline plus uniform noise.
pub struct MockThermometer {
    channel: Arc<dyn ChannelDriver>,
    base_celsius: f64,
    noise: f64,
    rng: MockRng,
    behavior: MockBehavior,
}

impl MockThermometer {
    /// Noise-free instant-mode thermometer.
    pub fn new(channel: Arc<dyn ChannelDriver>, base_celsius: f64) -> Self {
        Self {
            channel,
            base_celsius,
            noise: 0.0,
            rng: MockRng::new(None),
            behavior: MockBehavior::instant(),
        }
    }

    /// Thermometer from parsed configuration.
    pub fn with_config(channel: Arc<dyn ChannelDriver>, cfg: MockThermometerConfig) -> Self {
        Self {
            channel,
            base_celsius: cfg.base_celsius,
            noise: cfg.noise,
            rng: MockRng::new(cfg.seed),
            behavior: MockBehavior::new(cfg.mode, cfg.failure_rate, cfg.seed, TimingConfig::sensor()),
        }
    }
}

#[async_trait]
impl SensorDriver for MockThermometer {
    async fn read(&self) -> Result<Reading> {
        self.behavior.begin(SYMBOL, "read").await?;
        self.channel.transact("MEAS:TEMP?").await?;
        self.behavior.settle().await;
        let value = self.base_celsius + self.rng.noise(self.noise);
        tracing::trace!(value, "MockThermometer: read");
        Ok(Reading::new(value, "°C"))
    }
}
