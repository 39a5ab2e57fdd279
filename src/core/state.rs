//! Core State trait for state machine states.
//!
//! Every FSM in the crate keys its transition table on a type implementing
//! this trait. States are small `Copy` values with a stable integer index, so
//! they can be compared, logged and checkpointed without allocation.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Copy`: states are passed around by value on every fire
/// - `PartialEq`: the dispatcher matches rows by origin state
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states end up in checkpoints
///
/// Most implementations come from the [`state_enum!`](crate::state_enum)
/// macro rather than being written by hand.
///
/// # Example
///
/// ```rust
/// use parkassist::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
///     On,
/// }
///
/// impl State for Lamp {
///     const COUNT: usize = 2;
///
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::On => "On",
///         }
///     }
///
///     fn index(&self) -> usize {
///         *self as usize
///     }
///
///     fn is_idle(&self) -> bool {
///         matches!(self, Self::Off)
///     }
/// }
///
/// assert_eq!(Lamp::On.index(), 1);
/// assert!(Lamp::Off.is_idle());
/// ```
pub trait State:
    Copy + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Number of states in the state set. Valid indices are `0..COUNT`.
    const COUNT: usize;

    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Position of the state in its state set, in `0..COUNT`.
    fn index(&self) -> usize;

    /// Check if this is the resting state of the machine.
    ///
    /// A machine sitting in an idle state has no work in flight.
    ///
    /// Default implementation returns `false`.
    fn is_idle(&self) -> bool {
        false
    }
}
