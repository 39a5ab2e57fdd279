//! State transition history tracking.
//!
//! Keeps the most recent transitions of a machine in a fixed-capacity ring,
//! so recording a transition from inside `fire` never allocates.

use super::state::State;
use heapless::HistoryBuffer;
use serde::{Deserialize, Serialize};

/// Number of transitions retained by [`TransitionHistory`].
pub const HISTORY_CAPACITY: usize = 16;

/// Record of a single state transition.
///
/// `fire` is the machine's fire counter at the moment the transition was
/// taken; `dwell` is the number of stalled fires spent in `from` beforehand.
///
/// # Example
///
/// ```rust
/// use parkassist::core::StateTransition;
/// use parkassist::button::ButtonState;
///
/// let transition = StateTransition {
///     from: ButtonState::Released,
///     to: ButtonState::PressedWait,
///     fire: 7,
///     dwell: 6,
/// };
/// assert_eq!(transition.to, ButtonState::PressedWait);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Fire count at which the transition happened
    pub fire: u64,
    /// Stalled fires spent in `from` before leaving it
    pub dwell: u32,
}

/// Bounded, ordered history of state transitions.
///
/// Once [`HISTORY_CAPACITY`] transitions have been recorded the oldest ones
/// are overwritten.
pub struct TransitionHistory<S: State> {
    buffer: HistoryBuffer<StateTransition<S>, HISTORY_CAPACITY>,
}

impl<S: State> Default for TransitionHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            buffer: HistoryBuffer::new(),
        }
    }

    /// Record a transition, overwriting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        self.buffer.write(transition);
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.buffer.recent()
    }

    /// Number of retained transitions.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    /// Drop every retained transition.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over retained transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &StateTransition<S>> + '_ {
        self.buffer.oldest_ordered()
    }

    /// Copy of the retained transitions, oldest first.
    pub fn to_vec(&self) -> Vec<StateTransition<S>> {
        self.iter().copied().collect()
    }

    /// Get the path of states traversed.
    ///
    /// Returns the origin of the oldest retained transition followed by the
    /// destination of every retained transition.
    pub fn path(&self) -> Vec<S> {
        let mut path = Vec::with_capacity(self.len() + 1);
        if let Some(first) = self.iter().next() {
            path.push(first.from);
        }
        path.extend(self.iter().map(|t| t.to));
        path
    }
}
