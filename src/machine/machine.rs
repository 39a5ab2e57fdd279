//! Table-driven dispatcher.

use crate::core::{State, StateTransition, TransitionHistory};
use crate::machine::transition::Transition;
use log::trace;
use serde::{Deserialize, Serialize};

/// Result of a single `fire`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FireOutcome<S: State> {
    /// A row matched; the machine moved (possibly to the same state)
    Transitioned { from: S, to: S },

    /// No guard was true; the machine stayed in `state`
    Stalled { state: S },
}

impl<S: State> FireOutcome<S> {
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }

    /// State the machine is in after the fire.
    pub fn state(&self) -> S {
        match self {
            Self::Transitioned { to, .. } => *to,
            Self::Stalled { state } => *state,
        }
    }
}

/// Counters describing how a machine has been driven.
///
/// A stall is a fire in which no guard was true. A long run of consecutive
/// stalls is how a hardware flag that never arrives becomes observable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireStats {
    pub fires: u64,
    pub transitions: u64,
    pub stalls: u64,
    pub consecutive_stalls: u32,
    pub longest_stall: u32,
}

/// State machine that dispatches over an ordered transition table.
///
/// The machine does not own its context: the concrete FSM keeps its data and
/// hardware port in a context value `C` and hands it to [`Machine::fire`].
pub struct Machine<S: State, C> {
    name: &'static str,
    current: S,
    transitions: Vec<Transition<S, C>>,
    history: TransitionHistory<S>,
    stats: FireStats,
}

impl<S: State, C> Machine<S, C> {
    /// Create a machine over an already validated table.
    pub(crate) fn new(name: &'static str, initial: S, transitions: Vec<Transition<S, C>>) -> Self {
        Self {
            name,
            current: initial,
            transitions,
            history: TransitionHistory::new(),
            stats: FireStats::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get current state
    pub fn current_state(&self) -> S {
        self.current
    }

    /// Check if machine is resting in an idle state
    pub fn is_idle(&self) -> bool {
        self.current.is_idle()
    }

    pub fn history(&self) -> &TransitionHistory<S> {
        &self.history
    }

    pub fn stats(&self) -> &FireStats {
        &self.stats
    }

    /// The transition table, in evaluation order.
    pub fn transitions(&self) -> &[Transition<S, C>] {
        &self.transitions
    }

    /// Evaluate the table once.
    ///
    /// Rows are scanned in declaration order; the first row whose origin is
    /// the current state and whose guard holds has its action run against
    /// `ctx`, and the machine moves to that row's destination. At most one
    /// row fires per call.
    pub fn fire(&mut self, ctx: &mut C) -> FireOutcome<S> {
        self.stats.fires += 1;
        let from = self.current;
        let view: &C = ctx;

        let matched = self
            .transitions
            .iter()
            .find(|t| t.can_execute(&from, view))
            .map(|t| (t.to, t.action));

        let Some((to, action)) = matched else {
            self.stats.stalls += 1;
            self.stats.consecutive_stalls = self.stats.consecutive_stalls.saturating_add(1);
            self.stats.longest_stall = self.stats.longest_stall.max(self.stats.consecutive_stalls);
            return FireOutcome::Stalled { state: from };
        };

        if let Some(action) = action {
            action.run(ctx);
        }

        self.enter(from, to);
        FireOutcome::Transitioned { from, to }
    }

    /// Force the machine into `state` without evaluating any row.
    ///
    /// Used for external recovery, e.g. when the echo of a measurement never
    /// arrives. The jump is recorded in the history like any transition.
    pub fn set_state(&mut self, state: S) {
        let from = self.current;
        self.enter(from, state);
    }

    /// Resume from a checkpoint: current state, retained history and counters.
    pub(crate) fn restore(
        &mut self,
        current: S,
        history: &[StateTransition<S>],
        stats: FireStats,
    ) {
        self.current = current;
        self.history.clear();
        for transition in history {
            self.history.record(*transition);
        }
        self.stats = stats;
    }

    fn enter(&mut self, from: S, to: S) {
        trace!("{}: {} -> {}", self.name, from.name(), to.name());
        self.history.record(StateTransition {
            from,
            to,
            fire: self.stats.fires,
            dwell: self.stats.consecutive_stalls,
        });
        self.current = to;
        self.stats.transitions += 1;
        self.stats.consecutive_stalls = 0;
    }
}
