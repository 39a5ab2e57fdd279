//! Transition table rows.

use crate::core::{Action, Guard, State};

/// A row of a transition table: `(from, guard, to, action)`.
///
/// A row without a guard always fires when the machine is in `from`; a row
/// without an action only changes the state.
pub struct Transition<S: State, C> {
    pub from: S,
    pub to: S,
    pub guard: Option<Guard<C>>,
    pub action: Option<Action<C>>,
}

impl<S: State, C> Transition<S, C> {
    /// Check if this row can fire from the current state.
    pub fn can_execute(&self, current: &S, ctx: &C) -> bool {
        if *current != self.from {
            return false;
        }

        self.guard.as_ref().is_none_or(|g| g.check(ctx))
    }

    /// Whether the row fires unconditionally from its origin.
    pub fn is_unguarded(&self) -> bool {
        self.guard.is_none()
    }
}

impl<S: State, C> Clone for Transition<S, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: State, C> Copy for Transition<S, C> {}
