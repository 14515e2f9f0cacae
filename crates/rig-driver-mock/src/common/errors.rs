//! Error injection for mock devices.
//!
//! Chaos-mode mocks consult an [`ErrorConfig`] before every operation. Failures
//! come back as rig-core [`DriverError`]s so callers see the same error shape
//! a real driver would produce.

use std::sync::Arc;

use rig_core::error::{DriverError, DriverErrorKind};

use super::mode::MockMode;
use super::rng::MockRng;

/// Error injection configuration for mock devices
#[derive(Clone, Debug)]
pub struct ErrorConfig {
    /// Failure probability per operation (0.0 to 1.0)
    failure_rate: f64,
    rng: Arc<MockRng>,
}

impl ErrorConfig {
    /// No injected errors.
    pub fn none() -> Self {
        Self::random_failures_seeded(0.0, None)
    }

    /// Uniform random failures with an optional seed.
    pub fn random_failures_seeded(rate: f64, seed: Option<u64>) -> Self {
        Self {
            failure_rate: rate,
            rng: Arc::new(MockRng::new(seed)),
        }
    }

    /// Error config derived from a mock's configured mode.
    ///
    /// Only [`MockMode::Chaos`] injects failures.
    pub fn for_mode(mode: MockMode, failure_rate: f64, seed: Option<u64>) -> Self {
        match mode {
            MockMode::Chaos => Self::random_failures_seeded(failure_rate, seed),
            MockMode::Instant | MockMode::Realistic => Self::none(),
        }
    }

    /// Check whether `operation` should fail and produce the matching error.
    pub fn check_operation(&self, driver: &str, operation: &str) -> Result<(), DriverError> {
        if self.rng.should_fail(self.failure_rate) {
            return Err(DriverError::new(
                driver,
                DriverErrorKind::Hardware,
                format!("Random failure on operation '{}'", operation),
            ));
        }
        Ok(())
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::none()
    }
}
