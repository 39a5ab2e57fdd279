//! Strongly-typed hardware identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a push button line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ButtonId(u8);

impl ButtonId {
    /// The parking-mode button on the reference board.
    pub const PARKING: ButtonId = ButtonId(0);

    pub const fn new(raw: u8) -> Self {
        ButtonId(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub(crate) fn slot(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "button#{}", self.0)
    }
}

/// Identifier of an ultrasonic transceiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorId(u8);

impl SensorId {
    /// The rear parking sensor on the reference board.
    pub const REAR_PARKING: SensorId = SensorId(0);

    pub const fn new(raw: u8) -> Self {
        SensorId(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub(crate) fn slot(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor#{}", self.0)
    }
}
