//! Seeded RNG wrapper for reproducible behavior.
//!
//! Provides a thread-safe, seeded random number generator for mock devices
//! so noise and failure injection can be replayed in tests.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MAX_AMPLITUDE: f64 = f64::MAX / 4.0;

/// Seeded RNG wrapper for reproducible random behavior
pub struct MockRng {
    inner: Mutex<ChaCha8Rng>,
}

impl MockRng {
    /// Create a new RNG with optional seed.
    /// If seed is None, uses a random seed from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// True with probability `rate` (clamped to 0.0..=1.0).
    pub fn should_fail(&self, rate: f64) -> bool {
        if rate <= 0.0 {
            return false;
        }
        if rate >= 1.0 {
            return true;
        }
        self.inner.lock().gen::<f64>() < rate
    }

    /// Uniform noise in `[-amplitude, amplitude]`.
    ///
    /// The amplitude is capped at `f64::MAX / 4` so the sampled span stays
    /// finite; NaN or non-positive amplitudes yield no noise.
    pub fn noise(&self, amplitude: f64) -> f64 {
        if amplitude.is_nan() || amplitude <= 0.0 {
            return 0.0;
        }
        let amplitude = amplitude.min(MAX_AMPLITUDE);
        self.inner.lock().gen_range(-amplitude..=amplitude)
    }
}

impl Default for MockRng {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for MockRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRng")
            .field("inner", &"<Mutex<ChaCha8Rng>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_deterministic() {
        let rng1 = MockRng::new(Some(42));
        let rng2 = MockRng::new(Some(42));
        for _ in 0..10 {
            assert_eq!(rng1.noise(1.0), rng2.noise(1.0));
        }
    }

    #[test]
    fn test_should_fail_bounds() {
        let rng = MockRng::new(Some(42));
        for _ in 0..100 {
            assert!(!rng.should_fail(0.0));
            assert!(rng.should_fail(1.0));
        }
    }

    #[test]
    fn test_noise_within_amplitude() {
        let rng = MockRng::new(Some(7));
        for _ in 0..1000 {
            let n = rng.noise(0.5);
            assert!((-0.5..=0.5).contains(&n), "noise {n} out of range");
        }
        assert_eq!(rng.noise(0.0), 0.0);
    }

    #[test]
    fn test_noise_extreme_amplitudes() {
        let rng = MockRng::new(Some(9));
        assert!(rng.noise(f64::MAX).is_finite());
        assert!(rng.noise(f64::INFINITY).is_finite());
        assert_eq!(rng.noise(f64::NAN), 0.0);
        assert_eq!(rng.noise(-1.0), 0.0);
    }
}
