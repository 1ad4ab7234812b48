// Crawl politeness configuration

use rand::Rng;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid delay range: bounds must be finite and non-negative (got {min}..{max})")]
    NegativeDelay { min: f64, max: f64 },

    #[error("Invalid delay range: minimum {min}s is greater than maximum {max}s")]
    InvertedDelay { min: f64, max: f64 },

    #[error("Invalid delay range: {0}s is too long to sleep for")]
    DelayTooLarge(f64),

    #[error("Missing required argument --{0}")]
    MissingArgument(&'static str),

    #[error("Unsupported output format '{0}' (expected json, csv or both)")]
    UnknownFormat(String),
}

/// Inclusive `[min, max]` range in seconds for jittered sleeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min: f64,
    max: f64,
}

impl DelayRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(ConfigError::NegativeDelay { min, max });
        }
        if min > max {
            return Err(ConfigError::InvertedDelay { min, max });
        }
        if Duration::try_from_secs_f64(max).is_err() {
            return Err(ConfigError::DelayTooLarge(max));
        }
        Ok(Self { min, max })
    }

    /// No waiting at all. Handy for tests and local fixtures.
    pub fn none() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Draw a delay uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let secs = if self.min == self.max {
            self.min
        } else {
            rng.random_range(self.min..=self.max)
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self { min: 1.0, max: 3.0 }
    }
}
