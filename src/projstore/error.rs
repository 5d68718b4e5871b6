use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Payload has no project id")]
    MissingId,

    #[error("Invalid project id: {0:?}")]
    InvalidId(String),

    /// The old file for `id` was removed but the staged copy never reached
    /// its final path. The record only survives in `staging`.
    #[error("Partial commit for project {id}: record left in {}: {source}", staging.display())]
    PartialCommit {
        id: String,
        staging: PathBuf,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Project id space exhausted")]
    IdsExhausted,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl StoreError {
    /// True for failures caused by the caller's payload rather than the disk.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            StoreError::Serialization(_) | StoreError::MissingId | StoreError::InvalidId(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
