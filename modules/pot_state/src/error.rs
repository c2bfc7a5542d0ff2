pub use sds_common::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PotError {
    #[error("epoch {epoch} is older than last reported epoch {last_reported}")]
    EpochRegression { epoch: u64, last_reported: u64 },

    #[error("invalid denomination: expected {expected}, got {got}")]
    InvalidDenom { expected: String, got: String },

    #[error("reward arithmetic overflow")]
    Overflow,

    #[error("peer registry failure: {0}")]
    Peers(#[source] anyhow::Error),

    #[error("store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl PotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PotError::EpochRegression { .. } => ErrorKind::InvalidEpoch,
            PotError::InvalidDenom { .. } => ErrorKind::InvalidDenom,
            PotError::Overflow | PotError::Peers(_) | PotError::Store(_) => ErrorKind::Internal,
        }
    }
}
