//! Transition table validation using Validation.
//!
//! Every row is checked and ALL violations are accumulated, so a malformed
//! table is reported in one pass instead of one defect at a time.

use crate::builder::error::TableViolation;
use crate::core::State;
use crate::machine::Transition;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Validate a transition table.
///
/// Returns `Validation::Success(())` if the table is well formed, or
/// `Validation::Failure` with every violation found.
pub fn validate_table<S: State, C>(
    table: &[Transition<S, C>],
) -> Validation<(), NonEmptyVec<TableViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<TableViolation>>> = Vec::new();

    for (row, transition) in table.iter().enumerate() {
        checks.push(check_range(row, &transition.from));
        checks.push(check_range(row, &transition.to));
        checks.push(check_reachable(table, row));
    }

    Validation::all_vec(checks).map(|_| ())
}

fn check_range<S: State>(row: usize, state: &S) -> Validation<(), NonEmptyVec<TableViolation>> {
    if state.index() < S::COUNT {
        Validation::success(())
    } else {
        Validation::fail(TableViolation::StateOutOfRange {
            row,
            state: state.name().to_string(),
            index: state.index(),
            count: S::COUNT,
        })
    }
}

fn check_reachable<S: State, C>(
    table: &[Transition<S, C>],
    row: usize,
) -> Validation<(), NonEmptyVec<TableViolation>> {
    let from = table[row].from;
    let shadow = table[..row]
        .iter()
        .position(|earlier| earlier.from == from && earlier.is_unguarded());

    match shadow {
        Some(shadowed_by) => Validation::fail(TableViolation::Unreachable {
            row,
            from: from.name().to_string(),
            shadowed_by,
        }),
        None => Validation::success(()),
    }
}
