//! Exponential backoff with jitter.

use super::strategy::Backoff;
use std::time::Duration;

/// Exponential backoff with multiplicative jitter.
///
/// The delay before re-attempt `n` is `base_delay * multiplier^n`, capped at
/// `max_delay`, with up to ±`jitter` fractional randomization to avoid
/// synchronized retries from concurrent callers.
///
/// Defaults match the gateway's transport-adapter policy: a single retry
/// starting at 500ms, doubling, capped at 10s, with 25% jitter.
#[derive(Debug, Clone)]
pub struct ExponentialJitter {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
}

impl ExponentialJitter {
    /// Create a builder for a custom strategy.
    pub fn builder() -> ExponentialJitterBuilder {
        ExponentialJitterBuilder::default()
    }
}

impl Default for ExponentialJitter {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

impl Backoff for ExponentialJitter {
    fn delay_for(&self, attempt: u32) -> Option<Duration> {
        let base = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let jittered = if self.jitter > 0.0 {
            // random factor in [1 - jitter, 1 + jitter]
            let factor = 1.0 + self.jitter * (rand::random::<f64>() * 2.0 - 1.0);
            capped * factor
        } else {
            capped
        };

        Some(Duration::from_secs_f64(
            jittered.min(self.max_delay.as_secs_f64()),
        ))
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Builder for [`ExponentialJitter`].
#[derive(Debug, Default)]
pub struct ExponentialJitterBuilder {
    max_retries: Option<u32>,
    base_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
}

impl ExponentialJitterBuilder {
    /// Maximum number of re-attempts after the initial one. Default: 1.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Delay before the first retry. Default: 500ms.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    /// Upper bound on any single delay. Default: 10s.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Growth factor between attempts. Default: 2.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Fractional jitter in `[0.0, 1.0]`. Default: 0.25.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Build the strategy, filling unset fields with defaults.
    pub fn build(self) -> ExponentialJitter {
        let defaults = ExponentialJitter::default();
        ExponentialJitter {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            base_delay: self.base_delay.unwrap_or(defaults.base_delay),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
            jitter: self.jitter.unwrap_or(defaults.jitter),
        }
    }
}
