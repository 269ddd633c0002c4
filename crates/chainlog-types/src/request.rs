use crate::seed::NetworkSeed;
use crate::transaction::{SequencedTransaction, UnsequencedTransaction};

/// Request to read transactions starting at `index`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadRequest {
    /// Expected ledger seed; empty skips the check.
    pub seed: NetworkSeed,
    pub index: i64,
    /// Maximum number of transactions to return. Clients treat values below 1
    /// as "use the configured maximum".
    pub count: i64,
}

impl ReadRequest {
    pub fn new(seed: NetworkSeed, index: i64, count: i64) -> Self {
        Self { seed, index, count }
    }
}

/// Result of a read: the ledger's seed and the transactions found, the first
/// of which has the requested index. Empty when a long poll timed out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadResult {
    pub seed: NetworkSeed,
    pub transactions: Vec<SequencedTransaction>,
}

/// Request to append a batch of transactions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppendRequest {
    pub seed: NetworkSeed,
    pub transactions: Vec<UnsequencedTransaction>,
}

impl AppendRequest {
    pub fn new(seed: NetworkSeed, transactions: Vec<UnsequencedTransaction>) -> Self {
        Self { seed, transactions }
    }
}

/// Result of an append: the ledger's seed and the index of the last
/// transaction in the ledger after the append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendResult {
    pub seed: NetworkSeed,
    pub last_index: i64,
}

/// Status of a ledger node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerStatus {
    /// Free-form description of the ledger, e.g. "mock" or "production".
    pub network_type: String,
    pub seed: NetworkSeed,
    pub last_index: i64,
    /// Node's clock, nanoseconds since the UNIX epoch.
    pub server_time: i64,
    /// Whether the node deems itself ready to serve reads and appends.
    pub ready: bool,
}
