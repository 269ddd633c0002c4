use serde::{Deserialize, Serialize};

/// A transaction that has not yet been written to the ledger.
///
/// `hash` is `SHA256(type ++ data)`. It may be left empty by callers; the
/// client fills it in before transmission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsequencedTransaction {
    /// Lets readers filter out transactions they don't care about.
    pub tx_type: String,
    pub data: Vec<u8>,
    pub hash: Vec<u8>,
}

impl UnsequencedTransaction {
    /// A transaction with no precomputed hash.
    pub fn new(tx_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            tx_type: tx_type.into(),
            data: data.into(),
            hash: Vec::new(),
        }
    }

    pub fn has_hash(&self) -> bool {
        !self.hash.is_empty()
    }
}

/// A transaction written to the ledger.
///
/// Only the ledger creates these, at append time. They are never modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedTransaction {
    pub tx_type: String,
    /// Position in the ledger, starting at 1 with no gaps.
    pub index: i64,
    /// Nanoseconds since the UNIX epoch; non-decreasing with `index`.
    pub timestamp: i64,
    pub data: Vec<u8>,
    /// `SHA256(type ++ data)`.
    pub hash: Vec<u8>,
    /// `SHA256(previous state_hash ++ hash)`, with an empty previous state
    /// hash for index 1.
    pub state_hash: Vec<u8>,
}
