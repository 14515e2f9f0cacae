//! Mock relay implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use rig_core::capabilities::{ChannelDriver, SwitchDriver};
use rig_core::driver::{
    parse_config, ActuatorDriver, ConfigParam, PluginConfig, PluginInstance, PluginType,
};
use rig_core::interface::{OperationSpec, SWITCH_INTERFACE};
use serde::Deserialize;

use crate::common::{require_channel, MockBehavior, MockMode, TimingConfig};

/// Symbol exported by plugin units.
pub const SYMBOL: &str = "mock.relay";

/// Configuration for [`MockRelay`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockRelayConfig {
    /// Relay output number on the board (default: 1)
    #[serde(default = "default_output")]
    pub output: u8,

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

fn default_output() -> u8 {
    1
}

static PARAMS: &[ConfigParam] = &[
    ConfigParam::new("output", "Relay output number (default 1)"),
    ConfigParam::new("mode", "instant | realistic | chaos"),
    ConfigParam::new("failure_rate", "Failure probability per operation in chaos mode"),
    ConfigParam::new("seed", "RNG seed for reproducible chaos"),
];

/// Plugin type for [`MockRelay`].
pub struct MockRelayType;

impl PluginType for MockRelayType {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn name(&self) -> &'static str {
        "Mock Relay"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        SWITCH_INTERFACE.operations
    }

    fn params(&self) -> &'static [ConfigParam] {
        PARAMS
    }

    fn validate(&self, config: &PluginConfig) -> Result<()> {
        let cfg: MockRelayConfig = parse_config(config)?;
        if cfg.output == 0 {
            anyhow::bail!("relay outputs are numbered from 1");
        }
        Ok(())
    }

    fn build(
        &self,
        config: PluginConfig,
        channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async move {
            let cfg: MockRelayConfig = parse_config(&config)?;
            let channel = require_channel(SYMBOL, channel)?;
            let relay = Arc::new(MockRelay::with_config(channel, cfg));
            Ok(PluginInstance::Actuator(ActuatorDriver::Switch(relay)))
        })
    }
}

/// Simulated relay output.
pub struct MockRelay {
    channel: Arc<dyn ChannelDriver>,
    output: u8,
    on: AtomicBool,
    behavior: MockBehavior,
}

impl MockRelay {
    /// Instant-mode relay on `output`, initially off.
    pub fn new(channel: Arc<dyn ChannelDriver>, output: u8) -> Self {
        Self {
            channel,
            output,
            on: AtomicBool::new(false),
            behavior: MockBehavior::instant(),
        }
    }

    /// Relay from parsed configuration.
    pub fn with_config(channel: Arc<dyn ChannelDriver>, cfg: MockRelayConfig) -> Self {
        Self {
            behavior: MockBehavior::new(cfg.mode, cfg.failure_rate, cfg.seed, TimingConfig::relay()),
            ..Self::new(channel, cfg.output)
        }
    }

    async fn switch(&self, on: bool, operation: &'static str) -> Result<()> {
        self.behavior.begin(SYMBOL, operation).await?;
        let state = if on { "ON" } else { "OFF" };
        self.channel
            .transact(&format!("RELAY {} {}", self.output, state))
            .await?;
        self.behavior.settle().await;
        self.on.store(on, Ordering::SeqCst);
        tracing::debug!(output = self.output, on, "MockRelay: switched");
        Ok(())
    }
}

#[async_trait]
impl SwitchDriver for MockRelay {
    async fn turn_on(&self) -> Result<()> {
        self.switch(true, "turn_on").await
    }

    async fn turn_off(&self) -> Result<()> {
        self.switch(false, "turn_off").await
    }

    async fn is_on(&self) -> Result<bool> {
        self.behavior.errors.check_operation(SYMBOL, "is_on")?;
        Ok(self.on.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_channel::MockSerialChannel;

    #[tokio::test]
    async fn test_relay_switches_and_reports() {
        let channel = Arc::new(MockSerialChannel::new("COM2"));
        channel.open().await.unwrap();
        let relay = MockRelay::new(channel.clone(), 3);

        assert!(!relay.is_on().await.unwrap());
        relay.turn_on().await.unwrap();
        assert!(relay.is_on().await.unwrap());
        relay.turn_off().await.unwrap();
        assert!(!relay.is_on().await.unwrap());

        assert_eq!(channel.history(), vec!["RELAY 3 ON", "RELAY 3 OFF"]);
    }

    #[tokio::test]
    async fn test_failed_transact_keeps_state() {
        let channel = Arc::new(MockSerialChannel::new("COM2"));
        let relay = MockRelay::new(channel, 1);

        assert!(relay.turn_on().await.is_err());
        assert!(!relay.is_on().await.unwrap());
    }

    #[test]
    fn test_output_zero_rejected() {
        let config = serde_json::json!({"output": 0}).as_object().cloned().unwrap();
        assert!(MockRelayType.validate(&config).is_err());
    }
}
