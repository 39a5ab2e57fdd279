//! Builder for constructing transition rows.

use crate::builder::error::BuildError;
use crate::core::{Action, Guard, State};
use crate::machine::Transition;

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State, C> {
    from: Option<S>,
    to: Option<S>,
    guard: Option<Guard<C>>,
    action: Option<Action<C>>,
}

impl<S: State, C> TransitionBuilder<S, C> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            guard: None,
            action: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.to = Some(state);
        self
    }

    /// Add a guard (optional). Without one the row always fires.
    pub fn guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard from a predicate function (optional).
    pub fn when(mut self, predicate: fn(&C) -> bool) -> Self {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add an action (optional).
    pub fn action(mut self, action: Action<C>) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an action from a function (optional).
    pub fn then(mut self, effect: fn(&mut C)) -> Self {
        self.action = Some(Action::new(effect));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, C>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;

        Ok(Transition {
            from,
            to,
            guard: self.guard,
            action: self.action,
        })
    }
}

impl<S: State, C> Default for TransitionBuilder<S, C> {
    fn default() -> Self {
        Self::new()
    }
}
