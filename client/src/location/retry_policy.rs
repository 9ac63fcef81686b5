use common::constants::{LOCATION_MAX_ATTEMPTS, LOCATION_RETRY_DELAY, LOCATION_TIMEOUT};
use rand::Rng;
use std::time::Duration;

/// Delay between two position attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    /// `initial * multiplier^(attempt - 1)`, capped at `max`. With `jitter`
    /// a random 0-25% is added, still capped at `max`.
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
        jitter: bool,
    },
}

impl Backoff {
    /// Delay to wait after the failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential {
                initial,
                max,
                multiplier,
                jitter,
            } => {
                let multiplier = if multiplier.is_finite() && *multiplier >= 0.0 {
                    *multiplier
                } else {
                    1.0
                };
                let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
                let secs = initial.as_secs_f64() * multiplier.powi(exponent);
                let max_secs = max.as_secs_f64();
                let base = if secs.is_finite() {
                    Duration::from_secs_f64(secs.min(max_secs))
                } else {
                    *max
                };
                let delay = if *jitter {
                    let factor = rand::thread_rng().gen_range(0.0..=0.25);
                    base + base.mul_f64(factor)
                } else {
                    base
                };
                delay.min(*max)
            }
        }
    }
}

/// How hard `LocationAcquirer` tries to get a fix.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: LOCATION_MAX_ATTEMPTS,
            attempt_timeout: LOCATION_TIMEOUT,
            backoff: Backoff::Fixed(LOCATION_RETRY_DELAY),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_timeout,
            backoff,
        }
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.delay_after(attempt)
    }
}
