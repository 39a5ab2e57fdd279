//! Build errors for machine and transition builders.

use thiserror::Error;

/// A single defect found while validating a transition table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableViolation {
    #[error("Row {row}: state '{state}' has index {index}, outside 0..{count}")]
    StateOutOfRange {
        row: usize,
        state: String,
        index: usize,
        count: usize,
    },

    #[error("Row {row} from '{from}' can never fire: row {shadowed_by} is unguarded")]
    Unreachable {
        row: usize,
        from: String,
        shadowed_by: usize,
    },
}

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Transition table rejected with {} violation(s): {}", .violations.len(), summarize(.violations))]
    InvalidTable { violations: Vec<TableViolation> },
}

fn summarize(violations: &[TableViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
