//! Poller configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields a working configuration:
//!
//! ```toml
//! poll_rate_hz = 30.0
//! warmup_ticks = 10
//! change_tolerance = 0.01
//! waveform_points = 128
//! meter_floor = 0.01
//! inbound_capacity = 256
//! ```

use crate::detector::DEFAULT_TOLERANCE;
use crate::error::ConfigError;
use rupture_core::DEFAULT_WAVEFORM_POINTS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default poller cadence.
pub const DEFAULT_POLL_RATE_HZ: f64 = 30.0;

/// Default number of Loading ticks before the surface is treated as ready.
pub const DEFAULT_WARMUP_TICKS: u32 = 10;

/// Display meter values below this are pushed as exactly zero.
pub const DEFAULT_METER_FLOOR: f32 = 0.01;

/// Default bound on buffered inbound control messages.
pub const DEFAULT_INBOUND_CAPACITY: usize = 256;

/// Settings for the presentation poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Ticks per second.
    pub poll_rate_hz: f64,
    /// Ticks spent in Loading before the first push.
    pub warmup_ticks: u32,
    /// Largest per-parameter change that does not trigger a push.
    pub change_tolerance: f32,
    /// Oscilloscope points per push.
    pub waveform_points: usize,
    /// Pre-format snap threshold for display meter values.
    pub meter_floor: f32,
    /// Inbound messages held while Loading or between ticks.
    pub inbound_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_rate_hz: DEFAULT_POLL_RATE_HZ,
            warmup_ticks: DEFAULT_WARMUP_TICKS,
            change_tolerance: DEFAULT_TOLERANCE,
            waveform_points: DEFAULT_WAVEFORM_POINTS,
            meter_floor: DEFAULT_METER_FLOOR,
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded bridge config");
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Render as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the poller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.poll_rate_hz.is_finite() || self.poll_rate_hz <= 0.0 {
            return Err(ConfigError::invalid(
                "poll_rate_hz",
                format!("must be a positive rate, got {}", self.poll_rate_hz),
            ));
        }
        let Ok(interval) = Duration::try_from_secs_f64(1.0 / self.poll_rate_hz) else {
            return Err(ConfigError::invalid(
                "poll_rate_hz",
                format!("tick period of {} is out of range", self.poll_rate_hz),
            ));
        };
        if interval.checked_mul(self.warmup_ticks).is_none() {
            return Err(ConfigError::invalid(
                "warmup_ticks",
                format!("{} ticks at {} Hz overflow", self.warmup_ticks, self.poll_rate_hz),
            ));
        }
        if !self.change_tolerance.is_finite() || self.change_tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "change_tolerance",
                format!("must be non-negative, got {}", self.change_tolerance),
            ));
        }
        if self.waveform_points == 0 {
            return Err(ConfigError::invalid("waveform_points", "must be at least 1"));
        }
        if !self.meter_floor.is_finite() || self.meter_floor < 0.0 {
            return Err(ConfigError::invalid(
                "meter_floor",
                format!("must be non-negative, got {}", self.meter_floor),
            ));
        }
        if self.inbound_capacity == 0 {
            return Err(ConfigError::invalid("inbound_capacity", "must be at least 1"));
        }
        Ok(())
    }

    /// Wall-clock time between ticks.
    ///
    /// Saturates at [`Duration::MAX`] for rates [`validate`](Self::validate)
    /// would reject.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.poll_rate_hz).unwrap_or(Duration::MAX)
    }

    /// Approximate wall-clock length of the Loading phase.
    pub fn warmup_duration(&self) -> Duration {
        self.tick_interval()
            .checked_mul(self.warmup_ticks)
            .unwrap_or(Duration::MAX)
    }
}
