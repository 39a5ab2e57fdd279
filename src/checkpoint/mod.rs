//! Checkpoint and resume functionality for the FSMs.
//!
//! A checkpoint captures where a machine is (state, retained history, fire
//! counters) together with the FSM-specific data it needs to carry on, so a
//! controller can be parked and resumed without losing a half-filled median
//! window or an in-progress debounce.

use crate::core::{State, StateTransition};
use crate::machine::{FireStats, Machine};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of a machine and its FSM data.
/// Does NOT include guards or actions (function pointers are not serializable);
/// the table is rebuilt when the FSM is constructed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: DeserializeOwned"
))]
pub struct Checkpoint<S: State, D> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the machine the checkpoint was taken from
    pub machine: String,

    /// Current state of the machine
    pub current_state: S,

    /// Retained transition history, oldest first
    pub history: Vec<StateTransition<S>>,

    /// Fire counters at the time of the checkpoint
    pub stats: FireStats,

    /// FSM-specific data
    pub data: D,
}

impl<S: State, D> Checkpoint<S, D> {
    /// Capture `machine` together with its FSM data.
    pub fn capture<C>(machine: &Machine<S, C>, data: D) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            machine: machine.name().to_string(),
            current_state: machine.current_state(),
            history: machine.history().to_vec(),
            stats: *machine.stats(),
            data,
        }
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<S: State, D: Serialize + DeserializeOwned> Checkpoint<S, D> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{MachineBuilder, TransitionBuilder};
    use crate::state_enum;

    state_enum! {
        enum Valve {
            Shut,
            Open,
        }
        idle: [Shut]
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct ValveData {
        cycles: u32,
    }

    fn always(_: &u32) -> bool {
        true
    }

    fn count(cycles: &mut u32) {
        *cycles += 1;
    }

    fn valve_machine() -> Machine<Valve, u32> {
        MachineBuilder::new()
            .named("valve")
            .transition(
                TransitionBuilder::new()
                    .from(Valve::Shut)
                    .to(Valve::Open)
                    .when(always)
                    .then(count),
            )
            .unwrap()
            .transition(
                TransitionBuilder::new()
                    .from(Valve::Open)
                    .to(Valve::Shut)
                    .when(always)
                    .then(count),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    fn sample() -> Checkpoint<Valve, ValveData> {
        let mut machine = valve_machine();
        let mut cycles = 0;
        machine.fire(&mut cycles);
        machine.fire(&mut cycles);
        machine.fire(&mut cycles);
        Checkpoint::capture(&machine, ValveData { cycles })
    }

    #[test]
    fn capture_reads_the_machine() {
        let checkpoint = sample();

        assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
        assert_eq!(checkpoint.machine, "valve");
        assert_eq!(checkpoint.current_state, Valve::Open);
        assert_eq!(checkpoint.history.len(), 3);
        assert_eq!(checkpoint.stats.transitions, 3);
        assert_eq!(checkpoint.data.cycles, 3);
    }

    #[test]
    fn json_round_trip() {
        let checkpoint = sample();
        let json = checkpoint.to_json().unwrap();
        let restored = Checkpoint::<Valve, ValveData>::from_json(&json).unwrap();
        assert_eq!(restored, checkpoint);
    }

    #[test]
    fn binary_round_trip() {
        let checkpoint = sample();
        let bytes = checkpoint.to_bytes().unwrap();
        let restored = Checkpoint::<Valve, ValveData>::from_bytes(&bytes).unwrap();
        assert_eq!(restored, checkpoint);
    }

    #[test]
    fn foreign_version_is_refused() {
        let mut checkpoint = sample();
        checkpoint.version = CHECKPOINT_VERSION + 1;
        let json = checkpoint.to_json().unwrap();

        let result = Checkpoint::<Valve, ValveData>::from_json(&json);

        assert!(matches!(
            result,
            Err(CheckpointError::UnsupportedVersion { found, supported })
                if found == CHECKPOINT_VERSION + 1 && supported == CHECKPOINT_VERSION
        ));
    }

    #[test]
    fn garbage_is_a_deserialization_error() {
        let result = Checkpoint::<Valve, ValveData>::from_json("not json");
        assert!(matches!(
            result,
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }
}
