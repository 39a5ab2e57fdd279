//! Reference hardware abstraction layer.
//!
//! Models the controller's pins and timers as interrupt-safe cells. The
//! `on_*` methods are the interrupt service routines: firmware calls them
//! from its vector table, tests call them to simulate hardware.

mod board;
mod button;
mod cell;
mod clock;
mod ultrasound;

pub use board::Board;
pub use button::ButtonLine;
pub use cell::{AtomicFlag, TickCell};
pub use clock::TickClock;
pub use ultrasound::UltrasoundChannel;
