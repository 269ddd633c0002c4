use chainlog_types::NetworkSeed;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The request is malformed and will be rejected again if resent as-is.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested index lies beyond the next unwritten index. Waiting for
    /// the ledger to catch up and retrying is expected to succeed.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request carried a seed belonging to another ledger. Carries the
    /// ledger's actual seed, which the caller may adopt for future requests.
    #[error("network seed mismatch, correct seed: {0}")]
    NetworkSeedMismatch(NetworkSeed),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Whether retrying the identical request may succeed.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Internal(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_classification() {
        assert!(LedgerError::NotFound("x".into()).is_temporary());
        assert!(LedgerError::Internal("x".into()).is_temporary());
        assert!(!LedgerError::BadRequest("x".into()).is_temporary());
        assert!(!LedgerError::NetworkSeedMismatch(NetworkSeed::empty()).is_temporary());
    }

    #[test]
    fn mismatch_message_names_seed() {
        let err = LedgerError::NetworkSeedMismatch(NetworkSeed::from_bytes(vec![0xab, 0xcd]));
        assert_eq!(err.to_string(), "network seed mismatch, correct seed: abcd");
    }
}
