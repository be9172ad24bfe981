use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Ingest,
    Encode,
    Sequence,
    Transition,
    Substitution,
    Distance,
    Cluster,
    Profile,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Encode => "encode",
            Stage::Sequence => "sequence",
            Stage::Transition => "transition",
            Stage::Substitution => "substitution",
            Stage::Distance => "distance",
            Stage::Cluster => "cluster",
            Stage::Profile => "profile",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    /// Invalid allow-list entry, cluster count, indel cost or schema.
    #[error("configuration error in {stage} stage: {message}")]
    Configuration { stage: Stage, message: String },

    /// Input violated a structural contract (missing code, ragged sequences,
    /// non-square or asymmetric matrix).
    #[error("data integrity error in {stage} stage: {message}")]
    DataIntegrity { stage: Stage, message: String },

    /// Input is well-formed but carries too little information to analyze.
    #[error("degenerate input in {stage} stage: {message}")]
    DegenerateInput { stage: Stage, message: String },
}

impl ProfileError {
    pub fn configuration(stage: Stage, message: impl Into<String>) -> Self {
        Self::Configuration {
            stage,
            message: message.into(),
        }
    }

    pub fn data_integrity(stage: Stage, message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            stage,
            message: message.into(),
        }
    }

    pub fn degenerate(stage: Stage, message: impl Into<String>) -> Self {
        Self::DegenerateInput {
            stage,
            message: message.into(),
        }
    }

    /// Stage that raised the error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration { stage, .. }
            | Self::DataIntegrity { stage, .. }
            | Self::DegenerateInput { stage, .. } => *stage,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
