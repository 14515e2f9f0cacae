//! Mock serial channel implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use rig_core::capabilities::ChannelDriver;
use rig_core::driver::{parse_config, ConfigParam, PluginConfig, PluginInstance, PluginType};
use rig_core::error::{DriverError, DriverErrorKind};
use rig_core::interface::{OperationSpec, CHANNEL_INTERFACE};
use serde::Deserialize;

use crate::common::{MockBehavior, MockMode, TimingConfig};

/// Symbol exported by plugin units.
pub const SYMBOL: &str = "mock.serial_channel";

// =============================================================================
// MockSerialChannelType - PluginType implementation
// =============================================================================

/// Configuration for [`MockSerialChannel`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockSerialChannelConfig {
    /// Port name, e.g. `/dev/ttyUSB0`
    pub port: String,

    /// Baud rate (default: 9600)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

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

fn default_baud_rate() -> u32 {
    9600
}

static PARAMS: &[ConfigParam] = &[
    ConfigParam::new("port", "Serial port name"),
    ConfigParam::new("baud_rate", "Baud rate (default 9600)"),
    ConfigParam::new("mode", "instant | realistic | chaos"),
    ConfigParam::new("failure_rate", "Failure probability per operation in chaos mode"),
    ConfigParam::new("seed", "RNG seed for reproducible chaos"),
];

/// Plugin type for [`MockSerialChannel`].
pub struct MockSerialChannelType;

impl PluginType for MockSerialChannelType {
    fn symbol(&self) -> &'static str {
        SYMBOL
    }

    fn name(&self) -> &'static str {
        "Mock Serial Channel"
    }

    fn operations(&self) -> &'static [OperationSpec] {
        CHANNEL_INTERFACE.operations
    }

    fn params(&self) -> &'static [ConfigParam] {
        PARAMS
    }

    fn validate(&self, config: &PluginConfig) -> Result<()> {
        let cfg: MockSerialChannelConfig = parse_config(config)?;
        if cfg.port.trim().is_empty() {
            anyhow::bail!("port must not be empty");
        }
        if cfg.baud_rate == 0 {
            anyhow::bail!("baud_rate must be positive");
        }
        Ok(())
    }

    fn build(
        &self,
        config: PluginConfig,
        _channel: Option<Arc<dyn ChannelDriver>>,
    ) -> BoxFuture<'static, Result<PluginInstance>> {
        Box::pin(async move {
            let cfg: MockSerialChannelConfig = parse_config(&config)?;
            Ok(PluginInstance::Channel(Arc::new(MockSerialChannel::with_config(cfg))))
        })
    }
}

// =============================================================================
// MockSerialChannel
// =============================================================================

/// Simulated serial line.
///
/// Replies `OK <request>` to every request while open and records every
/// request it receives.
pub struct MockSerialChannel {
    port: String,
    baud_rate: u32,
    open: AtomicBool,
    history: Mutex<Vec<String>>,
    behavior: MockBehavior,
}

impl MockSerialChannel {
    /// Instant-mode channel on `port`.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: default_baud_rate(),
            open: AtomicBool::new(false),
            history: Mutex::new(Vec::new()),
            behavior: MockBehavior::instant(),
        }
    }

    /// Channel from parsed configuration.
    pub fn with_config(cfg: MockSerialChannelConfig) -> Self {
        Self {
            behavior: MockBehavior::new(cfg.mode, cfg.failure_rate, cfg.seed, TimingConfig::channel()),
            baud_rate: cfg.baud_rate,
            ..Self::new(cfg.port)
        }
    }

    /// Port name.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Every request received so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl ChannelDriver for MockSerialChannel {
    async fn open(&self) -> Result<()> {
        self.behavior.begin(SYMBOL, "open").await?;
        self.open.store(true, Ordering::SeqCst);
        tracing::debug!(port = %self.port, baud_rate = self.baud_rate, "MockSerialChannel: opened");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        tracing::debug!(port = %self.port, "MockSerialChannel: closed");
        Ok(())
    }

    async fn transact(&self, request: &str) -> Result<String> {
        if !self.is_open() {
            return Err(DriverError::new(
                SYMBOL,
                DriverErrorKind::Communication,
                format!("port {} is not open", self.port),
            )
            .into());
        }
        self.behavior.begin(SYMBOL, "transact").await?;
        self.history.lock().push(request.to_string());
        tracing::trace!(port = %self.port, request, "MockSerialChannel: transact");
        Ok(format!("OK {}", request))
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
