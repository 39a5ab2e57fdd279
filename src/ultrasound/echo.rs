//! Echo timing to distance conversion.

use crate::config::UltrasoundConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An echo whose timing cannot be turned into a distance.
///
/// Anomalies are never propagated: the sample is dropped and the next
/// measurement cycle runs as usual.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingAnomaly {
    #[error("Echo timer overflowed {overflows} times, at most {limit} allowed")]
    EchoOverflow { overflows: u32, limit: u32 },

    #[error("Echo ended {ticks} ticks before it started")]
    ReversedEcho { ticks: u64 },
}

/// Raw capture of one echo pulse, in echo timer ticks (1 tick = 1 µs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EchoCapture {
    pub init_tick: u32,
    pub end_tick: u32,
    pub overflows: u32,
}

impl EchoCapture {
    /// Length of the echo pulse, counting full timer periods between edges.
    pub fn elapsed_ticks(&self, config: &UltrasoundConfig) -> Result<u64, TimingAnomaly> {
        if self.overflows > config.max_echo_overflows {
            return Err(TimingAnomaly::EchoOverflow {
                overflows: self.overflows,
                limit: config.max_echo_overflows,
            });
        }

        let elapsed = i64::from(self.end_tick) - i64::from(self.init_tick)
            + i64::from(self.overflows) * i64::from(config.echo_timer_period_ticks);
        u64::try_from(elapsed).map_err(|_| TimingAnomaly::ReversedEcho {
            ticks: elapsed.unsigned_abs(),
        })
    }

    pub fn distance_cm(&self, config: &UltrasoundConfig) -> Result<u32, TimingAnomaly> {
        let ticks = self.elapsed_ticks(config)?;
        Ok(ticks_to_cm(ticks, config.speed_of_sound_m_s))
    }
}

/// Round-trip echo time in µs to one-way distance in cm:
/// `ticks * speed / 20000`, saturating at `u32::MAX`.
pub fn ticks_to_cm(ticks: u64, speed_of_sound_m_s: u32) -> u32 {
    let cm = ticks.saturating_mul(u64::from(speed_of_sound_m_s)) / 20_000;
    u32::try_from(cm).unwrap_or(u32::MAX)
}
