//! Common infrastructure for mock devices.
//!
//! - **mode**: Operational modes (Instant, Realistic, Chaos)
//! - **timing**: Hardware-like timing configurations
//! - **errors**: Error injection framework
//! - **rng**: Seeded random number generator

pub mod errors;
pub mod mode;
pub mod rng;
pub mod timing;

pub use errors::ErrorConfig;
pub use mode::MockMode;
pub use rng::MockRng;
pub use timing::TimingConfig;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use rig_core::capabilities::ChannelDriver;

/// Mode, failure injection, and timing shared by every mock device.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Operational mode.
    pub mode: MockMode,
    /// Failure injection (inert outside chaos mode).
    pub errors: ErrorConfig,
    /// Delays applied in timed modes.
    pub timing: TimingConfig,
}

impl MockBehavior {
    /// Behavior for `mode`, injecting `failure_rate` only in chaos mode.
    pub fn new(mode: MockMode, failure_rate: f64, seed: Option<u64>, timing: TimingConfig) -> Self {
        Self {
            mode,
            errors: ErrorConfig::for_mode(mode, failure_rate, seed),
            timing,
        }
    }

    /// Instant mode, no failures, no delays.
    pub fn instant() -> Self {
        Self {
            mode: MockMode::Instant,
            errors: ErrorConfig::none(),
            timing: TimingConfig::default(),
        }
    }

    /// Run the failure check for `operation`, then wait out the communication delay.
    pub async fn begin(&self, driver: &str, operation: &'static str) -> Result<()> {
        self.errors.check_operation(driver, operation)?;
        self.mode.pause(self.timing.communication()).await;
        Ok(())
    }

    /// Wait out the settling time.
    pub async fn settle(&self) {
        self.mode.pause(self.timing.settling()).await;
    }
}

/// Unwrap the equipment channel a device plugin was built with.
pub fn require_channel(
    symbol: &str,
    channel: Option<Arc<dyn ChannelDriver>>,
) -> Result<Arc<dyn ChannelDriver>> {
    channel.ok_or_else(|| anyhow!("{} must be built on an equipment channel", symbol))
}
