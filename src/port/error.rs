//! Port error types.

use crate::port::ids::{ButtonId, SensorId};
use thiserror::Error;

/// Errors a HAL reports when a line or sensor is claimed.
///
/// These only surface at construction time; once an FSM owns an id, the
/// port reports problems through flag values.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("No button is wired as {0}")]
    UnknownButton(ButtonId),

    #[error("No ultrasound sensor is wired as {0}")]
    UnknownSensor(SensorId),

    #[error("{0} is already driven by another FSM")]
    ButtonInUse(ButtonId),

    #[error("{0} is already driven by another FSM")]
    SensorInUse(SensorId),
}
