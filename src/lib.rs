//! Parkassist: state machines for a rear parking-assistance controller
//!
//! The controller debounces a parking button and ranges obstacles with an
//! ultrasonic transceiver. Both are table-driven finite state machines
//! polled from a single loop; interrupt handlers only flip flags and store
//! timer ticks in the hardware layer, which the machines read through the
//! [`port`] traits.
//!
//! # Core Concepts
//!
//! - **State**: type-safe state sets via the `State` trait and `state_enum!`
//! - **Machine**: an ordered table of guarded rows, at most one fired per poll
//! - **Port**: the narrow hardware contract the FSMs are written against
//! - **Board**: a reference HAL built on atomic cells, driven by ISR entry points
//!
//! # Example
//!
//! ```rust
//! use parkassist::config::UltrasoundConfig;
//! use parkassist::hal::Board;
//! use parkassist::port::SensorId;
//! use parkassist::ultrasound::{UltrasoundFsm, UltrasoundState};
//!
//! let board = Board::default();
//! let mut sensor =
//!     UltrasoundFsm::new(SensorId::REAR_PARKING, UltrasoundConfig::default(), &board).unwrap();
//!
//! sensor.start();
//! sensor.fire();
//! assert_eq!(sensor.state(), UltrasoundState::TriggerStart);
//!
//! let channel = board.sensor(SensorId::REAR_PARKING).unwrap();
//! channel.on_trigger_timer();
//! sensor.fire();
//! channel.on_echo_capture(1_000);
//! sensor.fire();
//! channel.on_echo_capture(6_831);
//! sensor.fire();
//! assert_eq!(sensor.state(), UltrasoundState::SetDistance);
//! ```

pub mod builder;
pub mod button;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod error;
pub mod hal;
pub mod machine;
pub mod port;
pub mod ultrasound;

// Re-export commonly used types
pub use button::{ButtonFsm, ButtonState};
pub use crate::core::{Action, Guard, State, StateTransition};
pub use error::ConfigError;
pub use machine::{FireOutcome, FireStats, Fsm, Machine};
pub use ultrasound::{UltrasoundFsm, UltrasoundState};
