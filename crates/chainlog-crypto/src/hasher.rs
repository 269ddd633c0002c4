use sha2::{Digest, Sha256};

/// Content hash of a transaction: `SHA256(type ++ data)`.
pub fn transaction_hash(tx_type: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(tx_type.as_bytes());
    hasher.update(data);
    hasher.finalize().into()
}

/// Recompute the hash of `(tx_type, data)` and compare it against `claimed`.
///
/// A mismatch means the transaction was corrupted or tampered with; retrying
/// will not help.
pub fn verify_transaction_hash(
    tx_type: &str,
    data: &[u8],
    claimed: &[u8],
) -> Result<[u8; 32], HashError> {
    let computed = transaction_hash(tx_type, data);
    if computed.as_slice() != claimed {
        return Err(HashError::HashMismatch {
            expected: hex::encode(computed),
            actual: hex::encode(claimed),
        });
    }
    Ok(computed)
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashError {
    #[error("hash mismatch: computed {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
