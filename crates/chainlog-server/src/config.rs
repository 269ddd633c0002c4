use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Time reserved between the end of a long-poll and the request timeout, so
/// an empty poll result is still delivered before the request is cut off.
pub const POLL_GRACE: Duration = Duration::from_secs(1);

/// Configuration for the ledger gateway.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Reported by the status route.
    pub network_type: String,
    /// Transactions returned by a read that does not set `max_count`.
    pub default_count: i64,
    /// Upper bound on transactions returned by one read.
    pub max_count: i64,
    /// Long-poll wait for a read that does not set `timeout`.
    pub default_poll_timeout: Duration,
    /// Bound on handling one request, long-poll included.
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 4000)),
            network_type: chainlog_ledger::DEFAULT_NETWORK_TYPE.to_string(),
            default_count: 100,
            max_count: 1000,
            default_poll_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Set the listen address.
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Set the network type reported in status.
    pub fn with_network_type(mut self, network_type: impl Into<String>) -> Self {
        self.network_type = network_type.into();
        self
    }

    /// Set the default and maximum transactions per read.
    pub fn with_counts(mut self, default_count: i64, max_count: i64) -> Self {
        self.default_count = default_count;
        self.max_count = max_count;
        self
    }

    /// Set the long-poll timeout used when a read names none.
    pub fn with_default_poll_timeout(mut self, timeout: Duration) -> Self {
        self.default_poll_timeout = timeout;
        self
    }

    /// Set the overall per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Longest a read may wait for new transactions.
    pub fn poll_limit(&self) -> Duration {
        self.request_timeout.saturating_sub(POLL_GRACE)
    }

    /// Parse and validate a TOML config.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    /// Check counts and timeouts are usable.
    pub fn validate(&self) -> ServerResult<()> {
        if self.max_count < 1 {
            return Err(ServerError::Config("max_count must be at least 1".into()));
        }
        if self.default_count < 1 || self.default_count > self.max_count {
            return Err(ServerError::Config(format!(
                "default_count must be between 1 and max_count ({})",
                self.max_count
            )));
        }
        if self.request_timeout <= POLL_GRACE {
            return Err(ServerError::Config(format!(
                "request_timeout must exceed {POLL_GRACE:?}"
            )));
        }
        Ok(())
    }
}
