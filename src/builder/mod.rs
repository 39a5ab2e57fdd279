//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders, table validation and macros for
//! creating machines with minimal boilerplate while keeping malformed tables
//! a construction-time error.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;
pub mod validation;

pub use error::{BuildError, TableViolation};
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;
pub use validation::validate_table;

use crate::core::{Action, Guard, State};
use crate::machine::Transition;

/// Create a guarded table row, in the `(from, guard, to, action)` order used
/// when writing tables out by hand.
///
/// # Example
///
/// ```
/// use parkassist::builder::row;
/// use parkassist::state_enum;
///
/// state_enum! {
///     enum Relay {
///         Open,
///         Closed,
///     }
///     idle: [Open]
/// }
///
/// struct Coil {
///     energized: bool,
/// }
///
/// let close = row::<Relay, Coil>(Relay::Open, |c| c.energized, Relay::Closed, None);
/// assert!(close.can_execute(&Relay::Open, &Coil { energized: true }));
/// ```
pub fn row<S: State, C>(
    from: S,
    guard: fn(&C) -> bool,
    to: S,
    action: Option<fn(&mut C)>,
) -> Transition<S, C> {
    Transition {
        from,
        to,
        guard: Some(Guard::new(guard)),
        action: action.map(Action::new),
    }
}

/// Create a row that fires unconditionally from `from`.
pub fn unguarded<S: State, C>(from: S, to: S, action: Option<fn(&mut C)>) -> Transition<S, C> {
    Transition {
        from,
        to,
        guard: None,
        action: action.map(Action::new),
    }
}
