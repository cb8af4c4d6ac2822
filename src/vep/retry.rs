//! Randomized exponential backoff.
//!
//! The wait before retry `n` (counting from 1) is drawn uniformly from
//! `[0, min(max_delay, multiplier * exp_base^(n-1))]`.

use std::time::Duration;

use rand::Rng;

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default backoff multiplier
pub const DEFAULT_MULTIPLIER: Duration = Duration::from_secs(1);

/// Default exponential base
pub const DEFAULT_EXP_BASE: u32 = 2;

/// Default ceiling on a single wait
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Retry policy for annotation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1)
    pub max_attempts: u32,
    /// Scale of the exponential bound
    pub multiplier: Duration,
    /// Growth factor of the bound per retry
    pub exp_base: u32,
    /// Upper limit on any single wait
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            multiplier: DEFAULT_MULTIPLIER,
            exp_base: DEFAULT_EXP_BASE,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries `max_attempts` times without waiting
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Set the number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: Duration) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the ceiling on a single wait
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Attempts actually made; a zero setting still makes one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Upper bound of the wait before retry `retry` (1-based)
    pub fn bound(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let factor = (self.exp_base as f64).powi(exponent.min(i32::MAX as u32) as i32);
        let bound = self.multiplier.as_secs_f64() * factor;
        let max = self.max_delay.as_secs_f64();
        if !bound.is_finite() || bound >= max {
            self.max_delay
        } else {
            Duration::from_secs_f64(bound.max(0.0))
        }
    }

    /// Wait before retry `retry`, jittered with the given random source
    pub fn delay_with<R: Rng>(&self, retry: u32, rng: &mut R) -> Duration {
        let bound = self.bound(retry);
        if bound.is_zero() {
            return Duration::ZERO;
        }
        bound.mul_f64(rng.gen::<f64>())
    }

    /// Wait before retry `retry`, jittered with the thread-local generator
    pub fn delay(&self, retry: u32) -> Duration {
        self.delay_with(retry, &mut rand::thread_rng())
    }
}
