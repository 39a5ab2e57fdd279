//! FSM configuration.
//!
//! Both configs deserialize from JSON with every field optional; a missing
//! field takes the reference board's value.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Debounce interval of the parking button.
pub const DEFAULT_DEBOUNCE_MS: u32 = 150;

/// Speed of sound used for the echo conversion.
pub const SPEED_OF_SOUND_M_S: u32 = 343;

/// Samples per median window.
pub const NUM_MEASUREMENTS: usize = 5;

/// Ticks per echo timer period (1 MHz counter, auto-reload 65535).
pub const ECHO_TIMER_PERIOD_TICKS: u32 = 65_536;

/// Echo timer overflows tolerated within a single echo.
pub const MAX_ECHO_OVERFLOWS: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// Stable interval required before a level change is accepted.
    pub debounce_ms: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl ButtonConfig {
    pub fn with_debounce(debounce_ms: u32) -> Self {
        Self { debounce_ms }
    }

    /// Deadlines are computed with wrapping arithmetic and compared as a
    /// signed difference, so the interval must stay below half the clock range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms > i32::MAX as u32 {
            return Err(ConfigError::InvalidParameter {
                name: "debounce_ms",
                reason: format!("{} ms exceeds the clock's wrap window", self.debounce_ms),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UltrasoundConfig {
    pub speed_of_sound_m_s: u32,
    pub echo_timer_period_ticks: u32,
    pub max_echo_overflows: u32,
}

impl Default for UltrasoundConfig {
    fn default() -> Self {
        Self {
            speed_of_sound_m_s: SPEED_OF_SOUND_M_S,
            echo_timer_period_ticks: ECHO_TIMER_PERIOD_TICKS,
            max_echo_overflows: MAX_ECHO_OVERFLOWS,
        }
    }
}

impl UltrasoundConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_of_sound_m_s == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "speed_of_sound_m_s",
                reason: "must be positive".to_string(),
            });
        }
        if self.echo_timer_period_ticks == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "echo_timer_period_ticks",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
