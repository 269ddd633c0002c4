use std::sync::{Arc, Mutex};

use chainlog_crypto::HashChainVerifier;
use chainlog_types::{NetworkSeed, ReadRequest, SequencedTransaction};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::TransactionReader;
use crate::config::ScannerConfig;
use crate::error::ClientError;

/// Tails a ledger, delivering transactions in index order.
///
/// Each scan runs in its own task and reads with long-polls, so it keeps up
/// with new appends. A failed read is retried after `retry_period` until the
/// retry budget runs out; any successful read resets the budget. A response
/// that does not continue the scan where it left off ends it immediately.
///
/// When a scan ends on its own the channel closes and [`Scanner::error`]
/// reports why. Dropping the receiver stops the scan.
pub struct Scanner {
    reader: Arc<dyn TransactionReader>,
    config: ScannerConfig,
    error: Arc<Mutex<Option<ClientError>>>,
}

impl Scanner {
    pub fn new(reader: Arc<dyn TransactionReader>, config: ScannerConfig) -> Self {
        Self {
            reader,
            config,
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Start scanning at `index`. An empty `seed` accepts any ledger.
    pub fn scan(&self, index: i64, seed: NetworkSeed) -> mpsc::Receiver<SequencedTransaction> {
        let (tx, rx) = mpsc::channel(self.config.buffer.max(1));
        self.record(None);
        let scan = Scan {
            reader: Arc::clone(&self.reader),
            config: self.config.clone(),
            error: Arc::clone(&self.error),
            index,
            seed,
            last_state_hash: None,
            out: tx,
        };
        tokio::spawn(scan.run());
        rx
    }

    /// Why the last scan ended, once its channel has closed.
    pub fn error(&self) -> Option<ClientError> {
        self.error.lock().ok().and_then(|slot| slot.clone())
    }

    fn record(&self, error: Option<ClientError>) {
        if let Ok(mut slot) = self.error.lock() {
            *slot = error;
        }
    }
}

struct Scan {
    reader: Arc<dyn TransactionReader>,
    config: ScannerConfig,
    error: Arc<Mutex<Option<ClientError>>>,
    /// Next index to deliver.
    index: i64,
    seed: NetworkSeed,
    /// State hash of the transaction before `index`, once one was seen.
    last_state_hash: Option<Vec<u8>>,
    out: mpsc::Sender<SequencedTransaction>,
}

impl Scan {
    async fn run(mut self) {
        let mut failures = 0u32;
        loop {
            let req = ReadRequest::new(self.seed.clone(), self.index, 0);
            let result = tokio::select! {
                _ = self.out.closed() => {
                    debug!(index = self.index, "receiver dropped, stopping scan");
                    return;
                }
                result = self.reader.read_transactions(req, None) => result,
            };

            match result {
                Ok(result) => {
                    failures = 0;
                    if let Err(e) = self.check(&result.transactions) {
                        warn!(index = self.index, error = %e, "scan stopped");
                        self.finish(e);
                        return;
                    }
                    for transaction in result.transactions {
                        self.index += 1;
                        self.last_state_hash = Some(transaction.state_hash.clone());
                        if let Some(filter) = &self.config.type_filter {
                            if &transaction.tx_type != filter {
                                continue;
                            }
                        }
                        if self.out.send(transaction).await.is_err() {
                            debug!(index = self.index, "receiver dropped, stopping scan");
                            return;
                        }
                    }
                }
                Err(e) if e.is_discontinuity() => {
                    warn!(index = self.index, error = %e, "scan stopped");
                    self.finish(e);
                    return;
                }
                Err(e) => {
                    failures += 1;
                    if !self.config.retries.allows(failures) {
                        warn!(index = self.index, failures, error = %e, "scan gave up");
                        self.finish(e);
                        return;
                    }
                    debug!(index = self.index, failures, error = %e, "read failed, retrying");
                    tokio::select! {
                        _ = self.out.closed() => return,
                        _ = tokio::time::sleep(self.config.retry_period) => {}
                    }
                }
            }
        }
    }

    /// The batch must start at the scan position and chain onto what was
    /// already delivered.
    fn check(&self, transactions: &[SequencedTransaction]) -> Result<(), ClientError> {
        if let Some(first) = transactions.first() {
            if first.index != self.index {
                return Err(ClientError::Discontinuity {
                    expected: self.index,
                    actual: first.index,
                });
            }
        }
        HashChainVerifier::verify_links(self.last_state_hash.as_deref(), transactions)?;
        Ok(())
    }

    fn finish(self, error: ClientError) {
        if let Ok(mut slot) = self.error.lock() {
            *slot = Some(error);
        }
        // Dropping `self.out` here closes the channel after the error is set.
    }
}
