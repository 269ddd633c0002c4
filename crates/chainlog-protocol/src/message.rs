use serde::{Deserialize, Serialize};

// Read route (GET /transactions/{index})

/// Response to a read.
///
/// Error responses carry only `error`; every other field falls back to its
/// default when decoding them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResponse {
    /// Index of the first transaction returned, or the requested index if
    /// none were returned.
    #[serde(default)]
    pub first_index: i64,
    /// Empty for `metadata_only` reads.
    #[serde(default)]
    pub transactions: Vec<EncodedSequencedTransaction>,
    /// Index of the last transaction returned, or one less than the requested
    /// index if none were returned.
    #[serde(default)]
    pub last_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A sequenced transaction as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSequencedTransaction {
    #[serde(rename = "type", default)]
    pub tx_type: String,
    #[serde(rename = "tx_index")]
    pub index: i64,
    /// Nanoseconds since the UNIX epoch.
    pub timestamp: i64,
    /// Base64 (standard alphabet, padded).
    pub data: String,
    /// Hex of `SHA256(type ++ data)`.
    pub hash: String,
    /// Hex of `SHA256(previous raw state hash ++ raw hash)`.
    pub state_hash: String,
}

// Append route (POST /transactions)

/// Body of an append request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendBody {
    pub transactions: Vec<EncodedUnsequencedTransaction>,
}

/// An unsequenced transaction as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedUnsequencedTransaction {
    #[serde(rename = "type", default)]
    pub tx_type: String,
    pub data: String,
    pub hash: String,
}

/// Whether appended transactions have been written yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppendStatus {
    /// Accepted with `async=true`; not yet written.
    Pending,
    #[default]
    Sequenced,
}

/// Response to an append.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendResponse {
    /// Index of the last written transaction. Absent for async appends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_index: Option<i64>,
    #[serde(default)]
    pub status: AppendStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppendResponse {
    pub fn sequenced(last_index: i64) -> Self {
        Self {
            last_index: Some(last_index),
            status: AppendStatus::Sequenced,
            error: None,
        }
    }

    pub fn pending() -> Self {
        Self {
            last_index: None,
            status: AppendStatus::Pending,
            error: None,
        }
    }
}

// Status route (GET /)

/// Status of the ledger node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub network_type: String,
    /// Hex-encoded seed. A surprising value means the ledger was reset or is
    /// a different ledger altogether.
    pub network_seed: String,
    pub last_index: i64,
    pub server_time: i64,
    pub ready: bool,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of every error response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
