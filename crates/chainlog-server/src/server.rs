use std::future::Future;
use std::sync::Arc;

use chainlog_ledger::{Ledger, MemoryLedger};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// HTTP server exposing one ledger.
pub struct LedgerServer {
    config: ServerConfig,
    ledger: Arc<dyn Ledger>,
}

impl LedgerServer {
    /// Serve a fresh in-memory ledger.
    pub fn new(config: ServerConfig) -> Self {
        let ledger = Arc::new(MemoryLedger::with_network_type(config.network_type.clone()));
        Self::with_ledger(config, ledger)
    }

    /// Serve an existing ledger, shared with the caller.
    pub fn with_ledger(config: ServerConfig, ledger: Arc<dyn Ledger>) -> Self {
        Self { config, ledger }
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The ledger behind the server.
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            Arc::clone(&self.ledger),
            self.config.clone(),
        ))
    }

    /// Bind the configured address and serve until `shutdown` completes.
    pub async fn serve_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        self.config.validate()?;
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> ServerResult<()> {
        self.config.validate()?;
        let addr = listener.local_addr()?;
        let app = self.router();
        tracing::info!(
            %addr,
            network_type = %self.config.network_type,
            "chainlog server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = LedgerServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:4000".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let server = LedgerServer::new(ServerConfig::default());
        let _router = server.router();
    }

    #[tokio::test]
    async fn ledger_uses_configured_network_type() {
        let server = LedgerServer::new(ServerConfig::default().with_network_type("devnet"));
        let status = server.ledger().server_status().await.unwrap();
        assert_eq!(status.network_type, "devnet");
        assert_eq!(status.last_index, 0);
    }

    #[tokio::test]
    async fn invalid_config_refuses_to_start() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = LedgerServer::new(ServerConfig::default().with_counts(0, 0));
        let result = server.serve_on(listener, async {}).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn shuts_down_on_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = LedgerServer::new(ServerConfig::default());
        server.serve_on(listener, async {}).await.unwrap();
    }
}
