//! Client SDK for chainlog.
//!
//! [`Client`] talks to a chainlog server over HTTP and verifies everything it
//! receives. [`Scanner`] builds on it to tail the ledger from any index,
//! delivering transactions over a channel.
//!
//! ```no_run
//! # async fn demo() -> Result<(), chainlog_sdk::ClientError> {
//! use std::sync::Arc;
//! use chainlog_sdk::{Client, Scanner, ScannerConfig};
//! use chainlog_types::NetworkSeed;
//!
//! let client = Arc::new(Client::new("http://127.0.0.1:4000")?);
//! let scanner = Scanner::new(client, ScannerConfig::default().with_type_filter("orders"));
//! let mut transactions = scanner.scan(1, NetworkSeed::empty());
//! while let Some(tx) = transactions.recv().await {
//!     println!("{} {}", tx.index, tx.tx_type);
//! }
//! if let Some(err) = scanner.error() {
//!     eprintln!("scan stopped: {err}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod scanner;

pub use client::{Client, TransactionReader};
pub use config::{ClientConfig, Retries, ScannerConfig};
pub use error::{ClientError, ClientResult};
pub use scanner::Scanner;
