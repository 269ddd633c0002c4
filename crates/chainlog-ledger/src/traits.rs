use async_trait::async_trait;
use chainlog_types::{
    AppendRequest, AppendResult, NetworkSeed, ReadRequest, ReadResult, ServerStatus,
};
use tokio::time::Instant;

use crate::error::LedgerResult;

/// Operations a ledger exposes to the network gateway.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Read transactions starting at `req.index`.
    ///
    /// When `req.index` is the next index to be written, waits for new data
    /// until `deadline` and returns an empty result if none arrives.
    async fn read_transactions(&self, req: ReadRequest, deadline: Instant)
        -> LedgerResult<ReadResult>;

    /// Append a batch of transactions atomically.
    async fn append_transactions(&self, req: AppendRequest) -> LedgerResult<AppendResult>;

    async fn server_status(&self) -> LedgerResult<ServerStatus>;

    /// The seed identifying this ledger instance.
    async fn network_seed(&self) -> LedgerResult<NetworkSeed> {
        Ok(self.server_status().await?.seed)
    }
}
