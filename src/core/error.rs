//! Error type for the clustering core

use thiserror::Error;

/// The only failure the engine reports. Raised when point or config input
/// cannot be read; the engine logs it and keeps its previous state.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClusterError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl ClusterError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
