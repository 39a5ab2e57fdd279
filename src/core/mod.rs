//! Core state machine types.
//!
//! This module contains the building blocks shared by every FSM:
//! - State definitions via the `State` trait
//! - Guard predicates and actions over an FSM context
//! - Bounded transition history

mod guard;
mod history;
mod state;

pub use guard::{Action, Guard};
pub use history::{StateTransition, TransitionHistory, HISTORY_CAPACITY};
pub use state::State;
