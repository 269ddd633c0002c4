use std::sync::Arc;
use std::time::Duration;

use chainlog_ledger::Ledger;
use tokio::time::Instant;

use crate::config::ServerConfig;

/// Turns a long-poll timeout into the deadline handed to the ledger.
pub type DeadlineFn = Arc<dyn Fn(Duration) -> Instant + Send + Sync>;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub config: Arc<ServerConfig>,
    pub deadline: DeadlineFn,
}

impl AppState {
    /// State whose deadlines are measured from the moment a read arrives.
    pub fn new(ledger: Arc<dyn Ledger>, config: ServerConfig) -> Self {
        Self {
            ledger,
            config: Arc::new(config),
            deadline: Arc::new(|timeout| Instant::now() + timeout),
        }
    }

    pub fn with_deadline_fn(
        mut self,
        deadline: impl Fn(Duration) -> Instant + Send + Sync + 'static,
    ) -> Self {
        self.deadline = Arc::new(deadline);
        self
    }
}
