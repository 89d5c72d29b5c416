//! Scheduler configuration.

use crate::transport::timing::{MAX_BPM, MIN_BPM, STEPS_PER_BAR};
use crate::{Error, Result};
use std::time::Duration;

/// Configuration for the lookahead step scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Tempo in quarter notes per minute.
    pub bpm: f64,
    /// Steps per bar before the step counter wraps.
    pub steps_per_bar: usize,
    /// How far ahead of the audio clock steps are scheduled (seconds).
    pub schedule_ahead: f64,
    /// Sleep between scheduling passes.
    pub lookahead_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            steps_per_bar: STEPS_PER_BAR,
            schedule_ahead: 0.1,
            lookahead_interval: Duration::from_millis(25),
        }
    }
}

impl SchedulerConfig {
    /// Default configuration at the given tempo.
    pub fn with_bpm(bpm: f64) -> Self {
        Self {
            bpm,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bpm(self.bpm)?;
        if self.steps_per_bar == 0 {
            return Err(Error::InvalidConfig("steps_per_bar must be > 0".into()));
        }
        if self.schedule_ahead.is_nan() || self.schedule_ahead <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "schedule_ahead {} must be positive",
                self.schedule_ahead
            )));
        }
        if self.lookahead_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "lookahead_interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Rejects tempos outside the supported range (including NaN).
pub fn validate_bpm(bpm: f64) -> Result<()> {
    if (MIN_BPM..=MAX_BPM).contains(&bpm) {
        Ok(())
    } else {
        Err(Error::InvalidTempo(bpm))
    }
}
