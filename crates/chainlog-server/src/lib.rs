//! HTTP gateway for chainlog.
//!
//! Exposes a [`chainlog_ledger::Ledger`] over HTTP: long-polling reads,
//! synchronous and fire-and-forget appends, and a status route. Every
//! response carries the ledger's network seed and API version.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use server::LedgerServer;
pub use state::{AppState, DeadlineFn};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chainlog_ledger::MemoryLedger;
    use chainlog_protocol::headers;
    use chainlog_types::NetworkSeed;
    use tower::util::ServiceExt;

    fn router_with_seed(seed: &NetworkSeed) -> axum::Router {
        let ledger = Arc::new(MemoryLedger::with_seed("mock", seed.clone()));
        LedgerServer::with_ledger(ServerConfig::default(), ledger).router()
    }

    #[tokio::test]
    async fn status_endpoint() {
        let seed = NetworkSeed::random();
        let response = router_with_seed(&seed)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get(headers::NETWORK_SEED).unwrap(),
            seed.to_hex().as_str()
        );
    }

    #[tokio::test]
    async fn append_then_read() {
        let seed = NetworkSeed::random();
        let app = router_with_seed(&seed);
        let body = serde_json::to_vec(&chainlog_protocol::AppendBody {
            transactions: chainlog_protocol::encode_unsequenced(&[
                chainlog_types::UnsequencedTransaction::new("alpha", b"one".to_vec()),
                chainlog_types::UnsequencedTransaction::new("beta", b"two".to_vec()),
            ]),
        })
        .unwrap();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transactions")
                    .header(headers::NETWORK_SEED, seed.to_hex())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/transactions/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let read: chainlog_protocol::ReadResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(read.first_index, 2);
        assert_eq!(read.last_index, 2);
        let txs = chainlog_protocol::decode_sequenced(&read.transactions).unwrap();
        assert_eq!(txs[0].tx_type, "beta");
        assert_eq!(txs[0].data, b"two");
    }
}
