use chainlog_types::SequencedTransaction;
use sha2::{Digest, Sha256};

/// Next state hash: `SHA256(prev_state_hash ++ hash)`.
///
/// `prev_state_hash` is empty for the first transaction of a ledger.
pub fn chain_hash(prev_state_hash: &[u8], hash: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(prev_state_hash);
    hasher.update(hash);
    hasher.finalize().into()
}

/// Running state hash of a ledger.
///
/// Starts empty; each pushed transaction hash folds into the state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateChain {
    state_hash: Vec<u8>,
}

impl StateChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the next transaction hash into the chain, returning the new state
    /// hash.
    pub fn push(&mut self, hash: &[u8]) -> Vec<u8> {
        self.state_hash = chain_hash(&self.state_hash, hash).to_vec();
        self.state_hash.clone()
    }

    /// Current state hash; empty before the first push.
    pub fn state_hash(&self) -> &[u8] {
        &self.state_hash
    }
}

/// State-hash chain verifier for received batches.
///
/// A reader that only sees a window of the ledger cannot recompute the first
/// state hash of the window without the one before it. It can, however, check
/// every link inside the window, and the genesis rule when the window starts
/// at index 1.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a contiguous batch of sequenced transactions.
    ///
    /// Checks:
    /// 1. Indexes increase by exactly one
    /// 2. Each state hash links to the previous one (`prev` for the first
    ///    transaction when known, the empty hash at index 1)
    pub fn verify_links(
        prev_state_hash: Option<&[u8]>,
        transactions: &[SequencedTransaction],
    ) -> Result<(), ChainError> {
        let mut prev: Option<&SequencedTransaction> = None;
        for tx in transactions {
            let expected_prev = match prev {
                Some(p) => {
                    if tx.index != p.index + 1 {
                        return Err(ChainError::IndexGap {
                            expected: p.index + 1,
                            actual: tx.index,
                        });
                    }
                    Some(p.state_hash.as_slice())
                }
                None if tx.index == 1 => Some(&[] as &[u8]),
                None => prev_state_hash,
            };

            if let Some(expected_prev) = expected_prev {
                if chain_hash(expected_prev, &tx.hash).as_slice() != tx.state_hash {
                    return Err(ChainError::BrokenLink { index: tx.index });
                }
            }
            prev = Some(tx);
        }
        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("index gap: expected {expected}, got {actual}")]
    IndexGap { expected: i64, actual: i64 },

    #[error("broken state hash link at index {index}")]
    BrokenLink { index: i64 },
}
