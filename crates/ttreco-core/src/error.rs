//! Error taxonomy for ttreco.
//!
//! Two families live here:
//!
//! * [`ReconstructionFailure`]: an event that cannot host the requested
//!   hypothesis. These are ordinary outcomes, returned as values and never
//!   raised as panics; the caller decides whether the event is discarded.
//! * [`InputError`] / [`ConfigError`]: malformed inputs caught once at the
//!   input boundary, before any combinatorics run.

use serde::{Deserialize, Serialize};

use crate::jets::JetIndex;

/// Why a reconstructor could not produce a hypothesis for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconstructionFailure {
    #[error("insufficient jets: found {found}, need at least {required}")]
    InsufficientJets { found: usize, required: usize },

    #[error("insufficient b-tagged jets: found {found}, need 2")]
    InsufficientBJets { found: usize },

    #[error("insufficient light jets for a dijet: found {found}, need 2")]
    InsufficientLightJets { found: usize },

    /// Every enumerated hypothesis had an undefined chi-square.
    #[error("no hypothesis produced a finite chi-square")]
    NoValidHypothesis,
}

impl ReconstructionFailure {
    /// Stable snake_case name, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientJets { .. } => "insufficient_jets",
            Self::InsufficientBJets { .. } => "insufficient_b_jets",
            Self::InsufficientLightJets { .. } => "insufficient_light_jets",
            Self::NoValidHypothesis => "no_valid_hypothesis",
        }
    }
}

/// Malformed jet inputs detected when building [`crate::jets::JetCandidates`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("jet handle {handle} out of range (collection holds {len} jets)")]
    HandleOutOfRange { handle: JetIndex, len: usize },

    #[error("jet handle {0} listed more than once")]
    DuplicateHandle(JetIndex),

    #[error("jet {handle} has non-finite {field}")]
    NonFinite { handle: JetIndex, field: &'static str },

    #[error("jet {handle} has negative pt {pt}")]
    NegativePt { handle: JetIndex, pt: f64 },

    #[error("jet column {column} has {found} entries, expected {expected}")]
    ColumnLengthMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{object} has non-finite {field}")]
    NonFiniteObject {
        object: &'static str,
        field: &'static str,
    },
}

/// Invalid numeric configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration value {0} is not finite")]
    NonFinite(&'static str),

    #[error("configuration value {field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum RecoError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for fallible ttreco operations.
pub type Result<T> = std::result::Result<T, RecoError>;
