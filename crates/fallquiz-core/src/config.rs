//! TOML-based session configuration.
//!
//! Every tunable of a session lives here:
//! - Fall timing and speed profile
//! - Point values and the streak multiplier window
//! - Power-up charges and freeze length
//! - Life pools per mode
//!
//! Missing keys fall back to their defaults, so an empty file is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::session::SessionMode;

/// Discrete fall-speed presets. Each multiplies `base_fall_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedProfile {
    Relaxed,
    Gentle,
    #[default]
    Normal,
    Quick,
    Blitz,
}

impl SpeedProfile {
    pub const ALL: [SpeedProfile; 5] = [
        SpeedProfile::Relaxed,
        SpeedProfile::Gentle,
        SpeedProfile::Normal,
        SpeedProfile::Quick,
        SpeedProfile::Blitz,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            SpeedProfile::Relaxed => 6.0,
            SpeedProfile::Gentle => 4.5,
            SpeedProfile::Normal => 3.0,
            SpeedProfile::Quick => 2.0,
            SpeedProfile::Blitz => 1.5,
        }
    }
}

/// Session configuration.
///
/// Serialized to/from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_base_fall_ms")]
    pub base_fall_ms: u64,
    #[serde(default)]
    pub speed: SpeedProfile,
    #[serde(default = "default_base_points")]
    pub base_points: u64,
    #[serde(default = "default_golden_points")]
    pub golden_points: u64,
    #[serde(default = "default_max_multiplier")]
    pub max_multiplier: u32,
    #[serde(default = "default_streak_window_ms")]
    pub streak_window_ms: u64,
    /// Granularity of the streak countdown.
    #[serde(default = "default_streak_tick_ms")]
    pub streak_tick_ms: u64,
    #[serde(default = "default_freeze_duration_ms")]
    pub freeze_duration_ms: u64,
    #[serde(default = "default_one")]
    pub freeze_charges: u32,
    #[serde(default = "default_one")]
    pub bomb_charges: u32,
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default = "default_finite_lives")]
    pub finite_lives: u32,
    #[serde(default = "default_infinite_lives")]
    pub infinite_lives: u32,
    /// Infinite mode appends a new batch once fewer questions remain.
    #[serde(default = "default_replenish_threshold")]
    pub replenish_threshold: usize,
    #[serde(default = "default_true")]
    pub shuffle_options: bool,
    /// Seed for option shuffling and bomb targeting (None = entropy).
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_base_fall_ms() -> u64 {
    2_000
}
fn default_base_points() -> u64 {
    10
}
fn default_golden_points() -> u64 {
    30
}
fn default_max_multiplier() -> u32 {
    5
}
fn default_streak_window_ms() -> u64 {
    5_000
}
fn default_streak_tick_ms() -> u64 {
    100
}
fn default_freeze_duration_ms() -> u64 {
    3_000
}
fn default_one() -> u32 {
    1
}
fn default_feedback_delay_ms() -> u64 {
    1_200
}
fn default_finite_lives() -> u32 {
    3
}
fn default_infinite_lives() -> u32 {
    5
}
fn default_replenish_threshold() -> usize {
    3
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_fall_ms: default_base_fall_ms(),
            speed: SpeedProfile::default(),
            base_points: default_base_points(),
            golden_points: default_golden_points(),
            max_multiplier: default_max_multiplier(),
            streak_window_ms: default_streak_window_ms(),
            streak_tick_ms: default_streak_tick_ms(),
            freeze_duration_ms: default_freeze_duration_ms(),
            freeze_charges: default_one(),
            bomb_charges: default_one(),
            feedback_delay_ms: default_feedback_delay_ms(),
            finite_lives: default_finite_lives(),
            infinite_lives: default_infinite_lives(),
            replenish_threshold: default_replenish_threshold(),
            shuffle_options: true,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: SessionConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()).into())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_fall_ms == 0 {
            return Err(ConfigError::invalid("base_fall_ms", "must be greater than 0"));
        }
        if self.max_multiplier < 2 {
            return Err(ConfigError::invalid("max_multiplier", "must be at least 2"));
        }
        if self.streak_tick_ms == 0 {
            return Err(ConfigError::invalid("streak_tick_ms", "must be greater than 0"));
        }
        if self.streak_window_ms < self.streak_tick_ms {
            return Err(ConfigError::invalid(
                "streak_window_ms",
                "must be at least one streak tick",
            ));
        }
        if self.finite_lives == 0 {
            return Err(ConfigError::invalid("finite_lives", "must be greater than 0"));
        }
        if self.infinite_lives == 0 {
            return Err(ConfigError::invalid("infinite_lives", "must be greater than 0"));
        }
        Ok(())
    }

    /// Total fall time for one question.
    pub fn fall_duration_ms(&self) -> u64 {
        (self.base_fall_ms as f64 * self.speed.multiplier()).round() as u64
    }

    pub fn lives_for(&self, mode: SessionMode) -> u32 {
        match mode {
            SessionMode::Finite => self.finite_lives,
            SessionMode::Infinite => self.infinite_lives,
        }
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
