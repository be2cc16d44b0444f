use crate::CardId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid quality {0}: expected 1..=5")]
    InvalidQuality(u8),
    #[error("card not found: {0}")]
    CardNotFound(CardId),
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("invalid input: {0}")]
    Invalid(&'static str),
    #[error("conflict: {0}")]
    Conflict(&'static str),
}

impl CoreError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        CoreError::Persistence(err.to_string())
    }
}
