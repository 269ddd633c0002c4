use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chainlog_crypto::{transaction_hash, verify_transaction_hash, StateChain};
use chainlog_types::{
    next_timestamp, unix_nanos, AppendRequest, AppendResult, NetworkSeed, ReadRequest,
    ReadResult, SequencedTransaction, ServerStatus, UnsequencedTransaction,
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::Ledger;

/// Network type reported by [`MemoryLedger`] unless configured otherwise.
pub const DEFAULT_NETWORK_TYPE: &str = "mock";

/// In-memory single-node ledger.
///
/// Holds every written transaction in memory; nothing survives a restart.
/// All state sits behind one mutex, so appends are serialized with each other
/// and with the bookkeeping part of reads.
///
/// Readers waiting for the next index subscribe to a generation counter while
/// holding the lock. Every append bumps the generation, waking all waiting
/// readers at once; each then re-locks and builds its own result.
pub struct MemoryLedger {
    network_type: String,
    inner: Mutex<LedgerState>,
}

struct LedgerState {
    seed: NetworkSeed,
    transactions: Vec<SequencedTransaction>,
    chain: StateChain,
    generation: watch::Sender<u64>,
}

impl LedgerState {
    fn verify_seed(&self, seed: &NetworkSeed) -> LedgerResult<()> {
        if !seed.accepts(&self.seed) {
            return Err(LedgerError::NetworkSeedMismatch(self.seed.clone()));
        }
        Ok(())
    }

    fn last_index(&self) -> i64 {
        self.transactions.len() as i64
    }

    /// Transactions `[index, index + count)`, clipped to what exists.
    fn slice(&self, index: i64, count: i64) -> Vec<SequencedTransaction> {
        let start = (index - 1) as usize;
        if start >= self.transactions.len() {
            return Vec::new();
        }
        let end = start
            .saturating_add(count as usize)
            .min(self.transactions.len());
        self.transactions[start..end].to_vec()
    }
}

impl MemoryLedger {
    /// Create an empty ledger with a fresh random seed.
    pub fn new() -> Self {
        Self::with_network_type(DEFAULT_NETWORK_TYPE)
    }

    /// Create an empty ledger reporting `network_type`, with a fresh seed.
    pub fn with_network_type(network_type: impl Into<String>) -> Self {
        Self::with_seed(network_type, NetworkSeed::random())
    }

    /// Create an empty ledger with an explicit seed.
    pub fn with_seed(network_type: impl Into<String>, seed: NetworkSeed) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            network_type: network_type.into(),
            inner: Mutex::new(LedgerState {
                seed,
                transactions: Vec::new(),
                chain: StateChain::new(),
                generation,
            }),
        }
    }

    /// The ledger's network seed.
    pub fn seed(&self) -> LedgerResult<NetworkSeed> {
        Ok(self.lock()?.seed.clone())
    }

    /// Index of the last transaction, 0 when empty.
    pub fn last_index(&self) -> LedgerResult<i64> {
        Ok(self.lock()?.last_index())
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, LedgerState>> {
        self.inner
            .lock()
            .map_err(|_| LedgerError::Internal("ledger lock poisoned".into()))
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash every transaction of a batch before any is written, so a bad
/// transaction rejects the whole batch.
fn hash_batch(transactions: &[UnsequencedTransaction]) -> LedgerResult<Vec<[u8; 32]>> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            if tx.has_hash() {
                verify_transaction_hash(&tx.tx_type, &tx.data, &tx.hash)
                    .map_err(|e| LedgerError::BadRequest(format!("transaction {i}: {e}")))
            } else {
                Ok(transaction_hash(&tx.tx_type, &tx.data))
            }
        })
        .collect()
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn read_transactions(
        &self,
        req: ReadRequest,
        deadline: Instant,
    ) -> LedgerResult<ReadResult> {
        let mut waiter = {
            let state = self.lock()?;
            state.verify_seed(&req.seed)?;

            if req.index < 1 {
                return Err(LedgerError::BadRequest(format!(
                    "index must be at least 1, got {}",
                    req.index
                )));
            }
            if req.count < 1 {
                return Err(LedgerError::BadRequest(format!(
                    "count must be at least 1, got {}",
                    req.count
                )));
            }

            let next = state.last_index() + 1;
            if req.index > next {
                return Err(LedgerError::NotFound(
                    "requested index is too far in the future".into(),
                ));
            }
            if req.index < next {
                return Ok(ReadResult {
                    seed: state.seed.clone(),
                    transactions: state.slice(req.index, req.count),
                });
            }
            // Subscribe while holding the lock so no append can slip in
            // between the length check and the wait.
            state.generation.subscribe()
        };

        debug!(index = req.index, "waiting for new transactions");
        if tokio::time::timeout_at(deadline, waiter.changed()).await.is_err() {
            debug!(index = req.index, "long poll expired without new transactions");
        }

        let state = self.lock()?;
        Ok(ReadResult {
            seed: state.seed.clone(),
            transactions: state.slice(req.index, req.count),
        })
    }

    async fn append_transactions(&self, req: AppendRequest) -> LedgerResult<AppendResult> {
        let mut state = self.lock()?;
        state.verify_seed(&req.seed)?;

        let hashes = hash_batch(&req.transactions)?;
        let count = req.transactions.len();
        for (tx, hash) in req.transactions.into_iter().zip(hashes) {
            let index = state.last_index() + 1;
            let timestamp = next_timestamp(state.transactions.last().map(|t| t.timestamp));
            let state_hash = state.chain.push(&hash);
            state.transactions.push(SequencedTransaction {
                tx_type: tx.tx_type,
                index,
                timestamp,
                data: tx.data,
                hash: hash.to_vec(),
                state_hash,
            });
        }

        let last_index = state.last_index();
        if count > 0 {
            state.generation.send_replace(last_index as u64);
            debug!(count, last_index, "transactions appended");
        }

        Ok(AppendResult {
            seed: state.seed.clone(),
            last_index,
        })
    }

    async fn server_status(&self) -> LedgerResult<ServerStatus> {
        let state = self.lock()?;
        Ok(ServerStatus {
            network_type: self.network_type.clone(),
            seed: state.seed.clone(),
            last_index: state.last_index(),
            server_time: unix_nanos(),
            ready: true,
        })
    }

    async fn network_seed(&self) -> LedgerResult<NetworkSeed> {
        self.seed()
    }
}
