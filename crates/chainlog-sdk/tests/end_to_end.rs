//! Client and scanner against a real server on an ephemeral port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::routing::get;
use axum::Router;
use chainlog_crypto::{chain_hash, transaction_hash, StateChain};
use chainlog_ledger::{Ledger, MemoryLedger};
use chainlog_protocol::{encode_sequenced, ReadResponse};
use chainlog_sdk::{Client, ClientConfig, ClientError, Retries, Scanner, ScannerConfig};
use chainlog_server::{LedgerServer, ServerConfig};
use chainlog_types::{
    AppendRequest, NetworkSeed, ReadRequest, SequencedTransaction, UnsequencedTransaction,
};
use tokio::net::TcpListener;
use tokio::time::Instant;

struct TestServer {
    url: String,
    ledger: Arc<MemoryLedger>,
}

async fn start_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let ledger = Arc::new(MemoryLedger::new());
    let server = LedgerServer::with_ledger(ServerConfig::default(), ledger.clone());
    tokio::spawn(server.serve_on(listener, std::future::pending()));
    TestServer { url, ledger }
}

fn txs(items: &[(&str, &str)]) -> Vec<UnsequencedTransaction> {
    items
        .iter()
        .map(|(t, d)| UnsequencedTransaction::new(*t, d.as_bytes().to_vec()))
        .collect()
}

fn append(items: &[(&str, &str)]) -> AppendRequest {
    AppendRequest::new(NetworkSeed::empty(), txs(items))
}

#[tokio::test]
async fn append_read_and_long_poll() {
    let server = start_server().await;
    let client = Arc::new(Client::new(&server.url).unwrap());

    let result = client
        .append_transactions(append(&[("alpha", "a"), ("beta", "b")]), None)
        .await
        .unwrap();
    assert_eq!(result.last_index, 2);
    assert_eq!(result.seed, server.ledger.seed().unwrap());

    let read = client
        .read_transactions(ReadRequest::new(NetworkSeed::empty(), 1, 0), None)
        .await
        .unwrap();
    let types: Vec<&str> = read.transactions.iter().map(|t| t.tx_type.as_str()).collect();
    assert_eq!(types, ["alpha", "beta"]);
    let first = &read.transactions[0];
    assert_eq!(first.hash, transaction_hash("alpha", b"a"));
    assert_eq!(first.state_hash, chain_hash(&[], &first.hash));

    // A read at the next index waits for the append below.
    let waiter = {
        let client = client.clone();
        tokio::spawn(async move {
            let deadline = Instant::now() + Duration::from_secs(10);
            client
                .read_transactions(ReadRequest::new(NetworkSeed::empty(), 3, 0), Some(deadline))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    client
        .append_transactions(append(&[("gamma", "c"), ("delta", "d")]), None)
        .await
        .unwrap();
    let woken = waiter.await.unwrap().unwrap();
    assert_eq!(woken.transactions[0].tx_type, "gamma");
    assert_eq!(woken.transactions[0].index, 3);
}

#[tokio::test]
async fn long_poll_times_out_empty() {
    let server = start_server().await;
    let client = Client::new(&server.url).unwrap();
    let started = Instant::now();
    let deadline = started + Duration::from_millis(400);
    let read = client
        .read_transactions(ReadRequest::new(NetworkSeed::empty(), 1, 1), Some(deadline))
        .await
        .unwrap();
    assert!(read.transactions.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn beyond_next_index_is_not_found() {
    let server = start_server().await;
    let client = Client::new(&server.url).unwrap();
    let err = client
        .read_transactions(ReadRequest::new(NetworkSeed::empty(), 5, 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(err.is_temporary());
}

#[tokio::test]
async fn wrong_seed_is_rejected_without_effect() {
    let server = start_server().await;
    let client = Client::new(&server.url).unwrap();
    let wrong = NetworkSeed::from_bytes(b"wrong seed".to_vec());

    let err = client
        .append_transactions(AppendRequest::new(wrong.clone(), txs(&[("t", "x")])), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::NetworkSeedMismatch(server.ledger.seed().unwrap())
    );
    assert_eq!(server.ledger.last_index().unwrap(), 0);

    let err = client
        .read_transactions(ReadRequest::new(wrong, 1, 1), Some(Instant::now() + Duration::from_secs(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NetworkSeedMismatch(_)));

    // The seed learned from the error works.
    let ClientError::NetworkSeedMismatch(seed) = err else {
        unreachable!()
    };
    let result = client
        .append_transactions(AppendRequest::new(seed, txs(&[("t", "x")])), None)
        .await
        .unwrap();
    assert_eq!(result.last_index, 1);
}

#[tokio::test]
async fn status_reports_ledger() {
    let server = start_server().await;
    let client = Client::new(&server.url).unwrap();
    client
        .append_transactions(append(&[("t", "1"), ("t", "2"), ("t", "3")]), None)
        .await
        .unwrap();
    let status = client.server_status(None).await.unwrap();
    assert_eq!(status.network_type, "mock");
    assert_eq!(status.last_index, 3);
    assert_eq!(status.seed, server.ledger.seed().unwrap());
    assert!(status.ready);
}

#[tokio::test]
async fn async_append_becomes_visible() {
    let server = start_server().await;
    let client = Client::new(&server.url).unwrap();
    client
        .append_transactions_async(append(&[("later", "x")]), None)
        .await
        .unwrap();
    let read = client
        .read_transactions(
            ReadRequest::new(NetworkSeed::empty(), 1, 1),
            Some(Instant::now() + Duration::from_secs(5)),
        )
        .await
        .unwrap();
    assert_eq!(read.transactions[0].tx_type, "later");
}

#[tokio::test]
async fn scanner_tails_with_filter() {
    let server = start_server().await;
    let config = ClientConfig::default().with_poll_timeout(Duration::from_millis(500));
    let client = Arc::new(Client::with_config(&server.url, config).unwrap());
    client
        .append_transactions(append(&[("keep", "1"), ("skip", "2")]), None)
        .await
        .unwrap();

    let scanner = Scanner::new(
        client.clone(),
        ScannerConfig::default()
            .with_type_filter("keep")
            .with_retries(Retries::Infinite),
    );
    let mut rx = scanner.scan(1, NetworkSeed::empty());
    assert_eq!(rx.recv().await.unwrap().index, 1);

    client
        .append_transactions(append(&[("skip", "3"), ("keep", "4")]), None)
        .await
        .unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.index, 4);
    assert_eq!(next.data, b"4");
    assert!(scanner.error().is_none());
}

#[tokio::test]
async fn scanner_stops_on_seed_mismatch() {
    let server = start_server().await;
    let client = Arc::new(Client::new(&server.url).unwrap());
    let scanner = Scanner::new(client, ScannerConfig::default());
    let mut rx = scanner.scan(1, NetworkSeed::from_bytes(b"wrong seed".to_vec()));
    assert!(rx.recv().await.is_none());
    assert_eq!(
        scanner.error(),
        Some(ClientError::NetworkSeedMismatch(server.ledger.seed().unwrap()))
    );
}

#[tokio::test]
async fn shared_ledger_handle_sees_client_appends() {
    let server = start_server().await;
    let client = Client::new(&server.url).unwrap();
    client
        .append_transactions(append(&[("t", "x")]), None)
        .await
        .unwrap();
    let status = server.ledger.server_status().await.unwrap();
    assert_eq!(status.last_index, 1);
}

fn sequenced(index: i64, data: &str, chain: &mut StateChain) -> SequencedTransaction {
    let hash = transaction_hash("t", data.as_bytes());
    SequencedTransaction {
        tx_type: "t".into(),
        index,
        timestamp: index,
        data: data.as_bytes().to_vec(),
        hash: hash.to_vec(),
        state_hash: chain.push(&hash),
    }
}

/// Stub ledger answering each read with `batches(index)`, counting requests.
async fn stub_server(
    batches: impl Fn(i64) -> Vec<SequencedTransaction> + Clone + Send + Sync + 'static,
) -> (String, Arc<AtomicUsize>) {
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();
    let app = Router::new().route(
        "/transactions/:index",
        get(move |Path(index): Path<i64>| {
            let batches = batches.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let txs = batches(index);
                axum::Json(ReadResponse {
                    first_index: index,
                    last_index: txs.last().map_or(index - 1, |t| t.index),
                    transactions: encode_sequenced(&txs),
                    error: None,
                })
            }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (url, requests)
}

#[tokio::test]
async fn scanner_stops_on_index_gap_without_retrying() {
    // Hashes and links are valid, only the indexes skip 2.
    let (url, requests) = stub_server(|_| {
        let mut chain = StateChain::new();
        vec![sequenced(1, "a", &mut chain), sequenced(3, "b", &mut chain)]
    })
    .await;
    let client = Arc::new(Client::new(&url).unwrap());
    let config = ScannerConfig::default()
        .with_retries(Retries::Limited(3))
        .with_retry_period(Duration::from_millis(10));
    let scanner = Scanner::new(client, config);
    let mut rx = scanner.scan(1, NetworkSeed::empty());

    let end = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap();
    assert!(end.is_none());
    assert_eq!(
        scanner.error(),
        Some(ClientError::Discontinuity {
            expected: 2,
            actual: 3
        })
    );
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scanner_stops_on_broken_link_between_reads() {
    // Index 2 is served from a different history than index 1.
    let (url, requests) = stub_server(|index| {
        let mut chain = StateChain::new();
        match index {
            1 => vec![sequenced(1, "a", &mut chain)],
            2 => {
                sequenced(1, "forked", &mut chain);
                vec![sequenced(2, "b", &mut chain)]
            }
            _ => vec![],
        }
    })
    .await;
    let client = Arc::new(Client::new(&url).unwrap());
    let config = ScannerConfig::default()
        .with_retries(Retries::Infinite)
        .with_retry_period(Duration::from_millis(10));
    let scanner = Scanner::new(client, config);
    let mut rx = scanner.scan(1, NetworkSeed::empty());

    assert_eq!(rx.recv().await.unwrap().index, 1);
    let end = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap();
    assert!(end.is_none());
    assert_eq!(scanner.error(), Some(ClientError::BrokenLink { index: 2 }));
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}
