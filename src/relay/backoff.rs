use std::time::Duration;

use crate::config::BackoffConfig;

/// Bounded exponential backoff: `initial * multiplier^n`, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Consecutive failures since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn next_delay(&mut self) -> Duration {
        let exponent = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        let secs = self.config.initial.as_secs_f64() * self.config.multiplier.powi(exponent);
        self.attempt = self.attempt.saturating_add(1);

        let max = self.config.max;
        if !secs.is_finite() || secs >= max.as_secs_f64() {
            max
        } else {
            Duration::from_secs_f64(secs.max(0.0))
        }
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
