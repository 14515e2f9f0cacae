//! Operational modes for mock devices.
//!
//! - **Instant**: Zero delays, deterministic behavior for unit tests
//! - **Realistic**: Hardware-like timing for integration tests
//! - **Chaos**: Hardware-like timing plus injected failures

use serde::Deserialize;
use tokio::time::{sleep, Duration};

/// Operational modes for mock devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockMode {
    /// Zero delays, deterministic - for unit tests
    #[default]
    Instant,
    /// Hardware-like timing - for integration tests
    Realistic,
    /// Timing plus configurable failures - for resilience testing
    Chaos,
}

impl MockMode {
    /// Whether operations should take simulated time.
    pub fn is_timed(&self) -> bool {
        !matches!(self, MockMode::Instant)
    }

    /// Sleep for `duration` unless in instant mode.
    pub async fn pause(&self, duration: Duration) {
        if self.is_timed() && !duration.is_zero() {
            sleep(duration).await;
        }
    }
}
