//! Timing configuration for realistic mode.
//!
//! Hardware-like delays applied when a mock runs in
//! [`MockMode::Realistic`](super::MockMode::Realistic) or `Chaos`.

use tokio::time::Duration;

/// Timing configuration for realistic mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingConfig {
    /// Settling time in milliseconds (valve travel, relay bounce)
    pub settling_time_ms: u64,
    /// Communication delay in milliseconds (one channel round trip)
    pub communication_delay_ms: u64,
}

impl TimingConfig {
    /// Serial channel: a few milliseconds per round trip.
    pub fn channel() -> Self {
        Self {
            settling_time_ms: 0,
            communication_delay_ms: 3,
        }
    }

    /// Sensor conversion time.
    pub fn sensor() -> Self {
        Self {
            settling_time_ms: 10,
            communication_delay_ms: 2,
        }
    }

    /// Relay contact bounce.
    pub fn relay() -> Self {
        Self {
            settling_time_ms: 5,
            communication_delay_ms: 2,
        }
    }

    /// Dimmer ramp.
    pub fn dimmer() -> Self {
        Self {
            settling_time_ms: 20,
            communication_delay_ms: 2,
        }
    }

    /// Valve travel.
    pub fn valve() -> Self {
        Self {
            settling_time_ms: 100,
            communication_delay_ms: 5,
        }
    }

    /// Motor settling after motion; travel time comes from the motor's speed.
    pub fn motor() -> Self {
        Self {
            settling_time_ms: 50,
            communication_delay_ms: 5,
        }
    }

    /// Settling time as a [`Duration`].
    pub fn settling(&self) -> Duration {
        Duration::from_millis(self.settling_time_ms)
    }

    /// Communication delay as a [`Duration`].
    pub fn communication(&self) -> Duration {
        Duration::from_millis(self.communication_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = TimingConfig::default();
        assert_eq!(config.settling_time_ms, 0);
        assert_eq!(config.communication_delay_ms, 0);
    }

    #[test]
    fn test_valve_timing() {
        let config = TimingConfig::valve();
        assert_eq!(config.settling(), Duration::from_millis(100));
        assert_eq!(config.communication(), Duration::from_millis(5));
    }

    #[test]
    fn test_motor_settles_longer_than_relay() {
        assert!(TimingConfig::motor().settling() > TimingConfig::relay().settling());
    }
}
