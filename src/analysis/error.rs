//! Engine error taxonomy
//!
//! Every variant is fatal for the run that produced it.

use gix::ObjectId;
use thiserror::Error;

use super::state::AnalysisState;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("failed to open repository: {0}")]
    Open(String),

    #[error("failed to read object {id}: {message}")]
    StoreRead { id: ObjectId, message: String },

    #[error("object enumeration failed: {0}")]
    Enumeration(String),

    #[error("failed to list references: {0}")]
    References(String),

    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error("analysis task failed: {0}")]
    Join(String),

    #[error("invalid analysis state: expected {expected:?}, found {found:?}")]
    InvalidState {
        expected: AnalysisState,
        found: AnalysisState,
    },
}

impl AnalysisError {
    pub fn store_read(id: ObjectId, err: impl std::fmt::Display) -> Self {
        AnalysisError::StoreRead {
            id,
            message: err.to_string(),
        }
    }

    /// Stable machine-readable code reported alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::Open(_) => "open",
            AnalysisError::StoreRead { .. } => "store_read",
            AnalysisError::Enumeration(_) => "enumeration",
            AnalysisError::References(_) => "references",
            AnalysisError::InternalConsistency(_) => "internal_consistency",
            AnalysisError::MalformedInput(_) => "malformed_input",
            AnalysisError::WorkerPool(_) => "worker_pool",
            AnalysisError::Join(_) => "join",
            AnalysisError::InvalidState { .. } => "invalid_state",
        }
    }
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(err: tokio::task::JoinError) -> Self {
        AnalysisError::Join(err.to_string())
    }
}
