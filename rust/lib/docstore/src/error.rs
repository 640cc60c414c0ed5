use horde_core::ServiceError;
use horde_kv::KVError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("{field} '{value}' already exists")]
    DuplicateKey { field: String, value: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("corrupt document '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<KVError> for DocError {
    fn from(e: KVError) -> Self {
        match e {
            KVError::Storage(msg) => DocError::Storage(msg),
        }
    }
}

impl From<DocError> for ServiceError {
    fn from(e: DocError) -> Self {
        match e {
            DocError::DuplicateKey { .. } => ServiceError::Conflict(e.to_string()),
            DocError::InvalidFilter(_)
            | DocError::InvalidUpdate(_)
            | DocError::InvalidDocument(_) => ServiceError::Validation(e.to_string()),
            DocError::Storage(msg) => ServiceError::Storage(msg),
            DocError::Corrupt { .. } => ServiceError::Internal(e.to_string()),
        }
    }
}
