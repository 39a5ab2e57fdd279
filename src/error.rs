//! Construction-time errors.

use crate::builder::BuildError;
use crate::port::PortError;
use thiserror::Error;

/// Why an FSM could not be created.
///
/// Nothing that happens after construction is reported through this type:
/// hardware timing problems are absorbed by the FSMs themselves.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Transition table rejected: {0}")]
    Build(#[from] BuildError),

    #[error("Hardware port refused the id: {0}")]
    Port(#[from] PortError),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}
