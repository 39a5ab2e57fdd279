//! Ultrasonic distance measurement.
//!
//! Each measurement raises the trigger line for one pulse width, times the
//! echo with an input-capture timer and converts the pulse length to a
//! distance. Raw samples go through a [`SampleWindow`] so a single spurious
//! echo never reaches the reported distance.
//!
//! ```text
//! WaitStart --active && ready--> TriggerStart --trigger end--> WaitEchoStart
//!                                     ^                              |
//!                            active && ready                  echo started
//!                                     |                              v
//!                               SetDistance <--echo received-- WaitEchoEnd
//! ```

pub mod echo;
pub mod fsm;
pub mod window;

pub use echo::{ticks_to_cm, EchoCapture, TimingAnomaly};
pub use fsm::{UltrasoundContext, UltrasoundFsm, UltrasoundSnapshot, UltrasoundState};
pub use window::{median, SampleWindow};
