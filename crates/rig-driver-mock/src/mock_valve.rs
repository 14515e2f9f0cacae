//! Mock flow valve implementation.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use rig_core::capabilities::{ChannelDriver, ValveDriver};
use rig_core::driver::{
    parse_config, ActuatorDriver, ConfigParam, PluginConfig, PluginInstance, PluginType,
};
use rig_core::interface::{OperationSpec, VALVE_INTERFACE};
use serde::Deserialize;

use crate::common::{require_channel, MockBehavior, MockMode, TimingConfig};

/// Symbol exported by plugin units.
pub const SYMBOL: &str = "mock.valve";

/// Configuration for [`MockValve`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockValveConfig {
    /// Valve address on the manifold (default: 1)
    #[serde(default = "default_address")]
    pub address: u8,

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

fn default_address() -> u8 {
    1
}

static PARAMS: &[ConfigParam] = &[
    ConfigParam::new("address", "Manifold address (default 1)"),
    ConfigParam::new("mode", "instant | realistic | chaos"),
    ConfigParam::new("failure_rate", "Failure probability per operation in chaos mode"),
    ConfigParam::new("seed", "RNG seed for reproducible chaos"),
];

/// Plugin type for [`MockValve`].
pub struct MockValveType;

impl PluginType for MockValveType {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn name(&self) -> &'static str {
        "Mock Valve"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        VALVE_INTERFACE.operations
    }

    fn params(&self) -> &'static [ConfigParam] {
        PARAMS
    }

    fn validate(&self, config: &PluginConfig) -> Result<()> {
        parse_config::<MockValveConfig>(config).map(|_| ())
    }

    fn build(
        &self,
        config: PluginConfig,
        channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async move {
            let cfg: MockValveConfig = parse_config(&config)?;
            let channel = require_channel(SYMBOL, channel)?;
            let valve = Arc::new(MockValve::with_config(channel, cfg));
            Ok(PluginInstance::Actuator(ActuatorDriver::Valve(valve)))
        })
    }
}

/// Simulated proportional valve, position in percent open.
pub struct MockValve {
    channel: Arc<dyn ChannelDriver>,
    address: u8,
    position: Mutex<f64>,
    behavior: MockBehavior,
}

impl MockValve {
    /// Instant-mode valve at `address`, initially closed.
    pub fn new(channel: Arc<dyn ChannelDriver>, address: u8) -> Self {
        Self {
            channel,
            address,
            position: Mutex::new(0.0),
            behavior: MockBehavior::instant(),
        }
    }

    /// Valve from parsed configuration.
    pub fn with_config(channel: Arc<dyn ChannelDriver>, cfg: MockValveConfig) -> Self {
        Self {
            behavior: MockBehavior::new(cfg.mode, cfg.failure_rate, cfg.seed, TimingConfig::valve()),
            ..Self::new(channel, cfg.address)
        }
    }

    async fn drive(&self, percent: f64, operation: &'static str) -> Result<()> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(anyhow!("valve position {:.1}% outside 0..=100", percent));
        }
        self.behavior.begin(SYMBOL, operation).await?;
        self.channel
            .transact(&format!("VALVE {} {:.1}", self.address, percent))
            .await?;
        self.behavior.settle().await;
        *self.position.lock() = percent;
        tracing::debug!(address = self.address, percent, "MockValve: positioned");
        Ok(())
    }
}

#[async_trait]
impl ValveDriver for MockValve {
    async fn open(&self) -> Result<()> {
        self.drive(100.0, "open").await
    }

    async fn close(&self) -> Result<()> {
        self.drive(0.0, "close").await
    }

    async fn set_position(&self, percent: f64) -> Result<()> {
        self.drive(percent, "set_position").await
    }

    async fn position(&self) -> Result<f64> {
        self.behavior.errors.check_operation(SYMBOL, "position")?;
        Ok(*self.position.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_channel::MockSerialChannel;

    #[tokio::test]
    async fn test_open_close_and_position() {
        let channel = Arc::new(MockSerialChannel::new("COM5"));
        channel.open().await.unwrap();
        let valve = MockValve::new(channel.clone(), 7);

        valve.open().await.unwrap();
        assert_eq!(valve.position().await.unwrap(), 100.0);
        valve.set_position(42.5).await.unwrap();
        assert_eq!(valve.position().await.unwrap(), 42.5);
        valve.close().await.unwrap();
        assert_eq!(valve.position().await.unwrap(), 0.0);

        assert_eq!(
            channel.history(),
            vec!["VALVE 7 100.0", "VALVE 7 42.5", "VALVE 7 0.0"]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_rejected() {
        let channel = Arc::new(MockSerialChannel::new("COM5"));
        channel.open().await.unwrap();
        let valve = MockValve::new(channel, 1);

        assert!(valve.set_position(120.0).await.is_err());
        assert!(valve.set_position(f64::NAN).await.is_err());
        assert_eq!(valve.position().await.unwrap(), 0.0);
    }
}
