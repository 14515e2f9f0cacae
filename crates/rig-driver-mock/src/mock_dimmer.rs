//! Mock dimmer implementation.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use rig_core::capabilities::{ChannelDriver, DimmerDriver};
use rig_core::driver::{
    parse_config, ActuatorDriver, ConfigParam, PluginConfig, PluginInstance, PluginType,
};
use rig_core::interface::{OperationSpec, DIMMER_INTERFACE};
use serde::Deserialize;

use crate::common::{require_channel, MockBehavior, MockMode, TimingConfig};

/// Symbol exported by plugin units.
pub const SYMBOL: &str = "mock.dimmer";

/// Lowest accepted level.
pub const MIN_LEVEL: i64 = 0;
/// Highest accepted level.
pub const MAX_LEVEL: i64 = 100;

/// Configuration for [`MockDimmer`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockDimmerConfig {
    /// Dimmer channel number on the controller (default: 1)
    #[serde(default = "default_zone")]
    pub zone: u8,

    /// Level at power-up (default: 0)
    #[serde(default)]
    pub initial_level: i64,

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

fn default_zone() -> u8 {
    1
}

static PARAMS: &[ConfigParam] = &[
    ConfigParam::new("zone", "Controller zone number (default 1)"),
    ConfigParam::new("initial_level", "Level at power-up, 0 to 100"),
    ConfigParam::new("mode", "instant | realistic | chaos"),
    ConfigParam::new("failure_rate", "Failure probability per operation in chaos mode"),
    ConfigParam::new("seed", "RNG seed for reproducible chaos"),
];

fn check_level(level: i64) -> Result<i64> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(anyhow!(
            "level {} outside {}..={}",
            level,
            MIN_LEVEL,
            MAX_LEVEL
        ))
    }
}

/// Plugin type for [`MockDimmer`].
pub struct MockDimmerType;

impl PluginType for MockDimmerType {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn name(&self) -> &'static str {
        "Mock Dimmer"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        DIMMER_INTERFACE.operations
    }

    fn params(&self) -> &'static [ConfigParam] {
        PARAMS
    }

    fn validate(&self, config: &PluginConfig) -> Result<()> {
        let cfg: MockDimmerConfig = parse_config(config)?;
        check_level(cfg.initial_level).map(|_| ())
    }

    fn build(
        &self,
        config: PluginConfig,
        channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async move {
            let cfg: MockDimmerConfig = parse_config(&config)?;
            check_level(cfg.initial_level)?;
            let channel = require_channel(SYMBOL, channel)?;
            let dimmer = Arc::new(MockDimmer::with_config(channel, cfg));
            Ok(PluginInstance::Actuator(ActuatorDriver::Dimmer(dimmer)))
        })
    }
}

/// Simulated dimmer with integer levels 0 to 100.
pub struct MockDimmer {
    channel: Arc<dyn ChannelDriver>,
    zone: u8,
    level: AtomicI64,
    behavior: MockBehavior,
}

impl MockDimmer {
    /// Instant-mode dimmer on `zone`, initially at level 0.
    pub fn new(channel: Arc<dyn ChannelDriver>, zone: u8) -> Self {
        Self {
            channel,
            zone,
            level: AtomicI64::new(MIN_LEVEL),
            behavior: MockBehavior::instant(),
        }
    }

    /// Dimmer from parsed configuration.
    pub fn with_config(channel: Arc<dyn ChannelDriver>, cfg: MockDimmerConfig) -> Self {
        let dimmer = Self {
            behavior: MockBehavior::new(cfg.mode, cfg.failure_rate, cfg.seed, TimingConfig::dimmer()),
            ..Self::new(channel, cfg.zone)
        };
        dimmer.level.store(cfg.initial_level, Ordering::SeqCst);
        dimmer
    }
}

#[async_trait]
impl DimmerDriver for MockDimmer {
    async fn set_level(&self, level: i64) -> Result<()> {
        let level = check_level(level)?;
        self.behavior.begin(SYMBOL, "set_level").await?;
        self.channel
            .transact(&format!("DIM {} {}", self.zone, level))
            .await?;
        self.behavior.settle().await;
        self.level.store(level, Ordering::SeqCst);
        tracing::debug!(zone = self.zone, level, "MockDimmer: level set");
        Ok(())
    }

    async fn level(&self) -> Result<i64> {
        self.behavior.errors.check_operation(SYMBOL, "level")?;
        Ok(self.level.load(Ordering::SeqCst))
    }

    async fn turn_off(&self) -> Result<()> {
        self.set_level(MIN_LEVEL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_channel::MockSerialChannel;
    use serde_json::json;

    async fn dimmer() -> (Arc<MockSerialChannel>, MockDimmer) {
        let channel = Arc::new(MockSerialChannel::new("COM4"));
        channel.open().await.unwrap();
        (channel.clone(), MockDimmer::new(channel, 2))
    }

    #[tokio::test]
    async fn test_set_level_and_turn_off() {
        let (channel, dimmer) = dimmer().await;

        dimmer.set_level(50).await.unwrap();
        assert_eq!(dimmer.level().await.unwrap(), 50);
        dimmer.turn_off().await.unwrap();
        assert_eq!(dimmer.level().await.unwrap(), 0);

        assert_eq!(channel.history(), vec!["DIM 2 50", "DIM 2 0"]);
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_without_traffic() {
        let (channel, dimmer) = dimmer().await;

        assert!(dimmer.set_level(101).await.is_err());
        assert!(dimmer.set_level(-1).await.is_err());
        assert!(channel.history().is_empty());
        assert_eq!(dimmer.level().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_initial_level_from_config() {
        let channel: Arc<dyn ChannelDriver> = Arc::new(MockSerialChannel::new("COM4"));
        let cfg: MockDimmerConfig = serde_json::from_value(json!({"initial_level": 30})).unwrap();
        let dimmer = MockDimmer::with_config(channel, cfg);
        assert_eq!(dimmer.level().await.unwrap(), 30);

        let bad = json!({"initial_level": 300}).as_object().cloned().unwrap();
        assert!(MockDimmerType.validate(&bad).is_err());
    }
}
