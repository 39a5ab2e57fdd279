//! The dispatch engine shared by every FSM.
//!
//! A [`Machine`] holds the current state and an ordered table of
//! [`Transition`] rows. Each call to [`Machine::fire`] scans the table once
//! and applies at most one row. Concrete FSMs compose a machine with their
//! own context and expose the [`Fsm`] capability.

mod machine;
mod transition;

pub use machine::{FireOutcome, FireStats, Machine};
pub use transition::Transition;

use crate::core::State;

/// Capability shared by the concrete FSMs, so a scheduler can poll them
/// without knowing what they measure.
pub trait Fsm {
    type State: State;

    /// Evaluate the transition table once.
    fn fire(&mut self) -> FireOutcome<Self::State>;

    fn current_state(&self) -> Self::State;

    fn stats(&self) -> &FireStats;
}
