use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(String),

    #[error("transaction {index}: invalid base64 data: {reason}")]
    InvalidData { index: usize, reason: String },

    #[error("transaction {index}: invalid hex in {field}: {reason}")]
    InvalidHex {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("hash mismatch on transaction {index}")]
    HashMismatch { index: usize },

    #[error("invalid network seed: {0}")]
    InvalidSeed(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
