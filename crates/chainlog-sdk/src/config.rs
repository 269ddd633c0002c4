use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::Client`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Transactions requested by a read whose count is not positive.
    pub max_count: i64,
    /// Long-poll timeout sent with reads that have no deadline.
    pub poll_timeout: Duration,
    /// Budget for an append without a deadline, on top of `call_timeout`.
    pub append_timeout: Duration,
    /// Allowance for one round trip.
    pub call_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_count: 100,
            poll_timeout: Duration::from_secs(10),
            append_timeout: Duration::from_secs(10),
            call_timeout: Duration::from_secs(2),
        }
    }
}

impl ClientConfig {
    pub fn with_max_count(mut self, max_count: i64) -> Self {
        self.max_count = max_count;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_append_timeout(mut self, timeout: Duration) -> Self {
        self.append_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// How many consecutive read failures a scanner tolerates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retries {
    Limited(u32),
    Infinite,
}

impl Retries {
    /// Whether a scan may continue after `failures` consecutive failures.
    pub fn allows(&self, failures: u32) -> bool {
        match self {
            Retries::Limited(max) => failures <= *max,
            Retries::Infinite => true,
        }
    }
}

impl Default for Retries {
    fn default() -> Self {
        Retries::Limited(0)
    }
}

/// Configuration for [`crate::Scanner`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Only transactions of this type are delivered. The scan still
    /// advances over the others.
    pub type_filter: Option<String>,
    pub retries: Retries,
    /// Pause between a failed read and its retry.
    pub retry_period: Duration,
    /// Capacity of the delivery channel.
    pub buffer: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            type_filter: None,
            retries: Retries::default(),
            retry_period: Duration::from_secs(5),
            buffer: 16,
        }
    }
}

impl ScannerConfig {
    pub fn with_type_filter(mut self, tx_type: impl Into<String>) -> Self {
        self.type_filter = Some(tx_type.into());
        self
    }

    pub fn with_retries(mut self, retries: Retries) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_period(mut self, period: Duration) -> Self {
        self.retry_period = period;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }
}
