use chainlog_crypto::ChainError;
use chainlog_protocol::ProtocolError;
use chainlog_types::NetworkSeed;
use thiserror::Error;

/// Errors returned by the client and recorded by scanners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server rejected the request as malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested index is beyond the ledger's next index.
    #[error("not found: {0}")]
    NotFound(String),

    /// The ledger has a different seed, carried here.
    #[error("network seed mismatch, correct seed: {0}")]
    NetworkSeedMismatch(NetworkSeed),

    #[error("server error: {0}")]
    Server(String),

    /// A status code outside the protocol.
    #[error("unexpected response (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },

    /// The response failed verification or did not parse.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The response does not continue at the expected index.
    #[error("index discontinuity: expected {expected}, got {actual}")]
    Discontinuity { expected: i64, actual: i64 },

    /// A state hash does not chain onto the transaction before it.
    #[error("broken state hash link at index {index}")]
    BrokenLink { index: i64 },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether retrying the identical request may succeed.
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Server(_) | Self::Timeout(_) | Self::Transport(_)
        )
    }

    /// Whether the ledger's history itself is inconsistent. A scan cannot
    /// continue past such an error, however often it retries.
    pub fn is_discontinuity(&self) -> bool {
        matches!(self, Self::Discontinuity { .. } | Self::BrokenLink { .. })
    }
}

impl From<ChainError> for ClientError {
    fn from(e: ChainError) -> Self {
        match e {
            ChainError::IndexGap { expected, actual } => Self::Discontinuity { expected, actual },
            ChainError::BrokenLink { index } => Self::BrokenLink { index },
        }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Transport(format!("connection failed: {e}"))
        } else {
            Self::Transport(e.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
