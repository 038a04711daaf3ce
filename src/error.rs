//! Error types.

use thiserror::Error;

/// Failure of a batch round trip to the cost engine. Always terminal for the
/// whole batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Could not reach cost engine: {0}")]
    Transport(String),

    #[error("Cost engine returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Could not decode cost engine response: {0}")]
    Decode(String),

    #[error("Cost engine returned {actual} results for {expected} items")]
    ResultCountMismatch { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid roster data: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid meso amount: {0}")]
    InvalidAmount(String),
}
