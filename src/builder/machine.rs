//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::builder::validation::validate_table;
use crate::core::State;
use crate::machine::{Machine, Transition};
use stillwater::validation::Validation;

/// Builder for constructing machines with a fluent API.
///
/// The initial state defaults to the origin of the first row.
pub struct MachineBuilder<S: State, C> {
    name: &'static str,
    initial: Option<S>,
    transitions: Vec<Transition<S, C>>,
}

impl<S: State, C> MachineBuilder<S, C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            name: "fsm",
            initial: None,
            transitions: Vec::new(),
        }
    }

    /// Name used in log output.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Override the initial state.
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<S, C>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, C>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, C>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the machine.
    /// Returns an error if the table is empty or malformed.
    pub fn build(self) -> Result<Machine<S, C>, BuildError> {
        let first = self.transitions.first().ok_or(BuildError::NoTransitions)?;
        let initial = self.initial.unwrap_or(first.from);

        if let Validation::Failure(errors) = validate_table(&self.transitions) {
            return Err(BuildError::InvalidTable {
                violations: errors.iter().cloned().collect(),
            });
        }

        Ok(Machine::new(self.name, initial, self.transitions))
    }
}

impl<S: State, C> Default for MachineBuilder<S, C> {
    fn default() -> Self {
        Self::new()
    }
}
