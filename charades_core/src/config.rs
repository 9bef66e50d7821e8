//! Configuration
//!
//! ```toml
//! [tilt]
//! pass_gamma_low = -50.0
//! pass_gamma_high = 0.0
//! correct_beta_abs = 140.0
//! cooldown_ms = 1000
//!
//! [timing]
//! tick_interval_ms = 1000
//! countdown_secs = 3
//! finish_linger_ms = 1000
//! feedback_ms = 300
//!
//! [sensor]
//! sample_hz = 50
//! default_gamma = -90.0
//! ```
//!
//! Every key is optional.  The round length is not configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calibration::DEFAULT_NEUTRAL_GAMMA;
use crate::classifier::TiltThresholds;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tilt:   TiltThresholds,
    pub timing: TimingConfig,
    pub sensor: SensorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Period of the round clock.  One tick removes one second.
    pub tick_interval_ms: u64,
    /// 3-2-1 before the first card.
    pub countdown_secs:   u32,
    /// How long the finished card screen stays up before the results.
    pub finish_linger_ms: u64,
    /// Correct/pass flash.
    pub feedback_ms:      u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            tick_interval_ms: 1000,
            countdown_secs:   3,
            finish_linger_ms: 1000,
            feedback_ms:      300,
        }
    }
}

impl TimingConfig {
    pub fn tick_interval(&self) -> Duration { Duration::from_millis(self.tick_interval_ms) }
    pub fn countdown(&self)     -> Duration { Duration::from_secs(self.countdown_secs as u64) }
    pub fn finish_linger(&self) -> Duration { Duration::from_millis(self.finish_linger_ms) }
    pub fn feedback(&self)      -> Duration { Duration::from_millis(self.feedback_ms) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Rate of the simulated sensor.
    pub sample_hz:     u32,
    /// Baseline gamma when the calibrating sample has none.
    pub default_gamma: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig { sample_hz: 50, default_gamma: DEFAULT_NEUTRAL_GAMMA }
    }
}

impl SensorConfig {
    pub fn sample_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.sample_hz.max(1) as u64)
    }
}

impl GameConfig {
    /// Check value ranges; the error names the first offending key.
    pub fn validate(&self) -> Result<()> {
        let t = &self.tilt;
        if !(-90.0..=90.0).contains(&t.pass_gamma_low) || !(-90.0..=90.0).contains(&t.pass_gamma_high) {
            return Err(Error::Config(format!(
                "tilt.pass_gamma_low/high must be in [-90, 90], got {} / {}",
                t.pass_gamma_low, t.pass_gamma_high
            )));
        }
        if t.pass_gamma_low >= t.pass_gamma_high {
            return Err(Error::Config(format!(
                "tilt.pass_gamma_low ({}) must be below pass_gamma_high ({})",
                t.pass_gamma_low, t.pass_gamma_high
            )));
        }
        if !(0.0..180.0).contains(&t.correct_beta_abs) {
            return Err(Error::Config(format!(
                "tilt.correct_beta_abs must be in [0, 180), got {}", t.correct_beta_abs
            )));
        }
        if t.cooldown_ms > 10_000 {
            return Err(Error::Config(format!(
                "tilt.cooldown_ms must be at most 10000, got {}", t.cooldown_ms
            )));
        }
        if self.timing.tick_interval_ms == 0 {
            return Err(Error::Config("timing.tick_interval_ms must be > 0".to_string()));
        }
        if self.timing.countdown_secs > 10 {
            return Err(Error::Config(format!(
                "timing.countdown_secs must be at most 10, got {}", self.timing.countdown_secs
            )));
        }
        if !(1..=240).contains(&self.sensor.sample_hz) {
            return Err(Error::Config(format!(
                "sensor.sample_hz must be in [1, 240], got {}", self.sensor.sample_hz
            )));
        }
        if !(-90.0..=90.0).contains(&self.sensor.default_gamma) {
            return Err(Error::Config(format!(
                "sensor.default_gamma must be in [-90, 90], got {}", self.sensor.default_gamma
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The default location if it exists, built-in defaults otherwise.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".tilt_charades").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
