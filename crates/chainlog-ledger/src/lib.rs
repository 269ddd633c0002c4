//! Append-only transaction ledger for chainlog.
//!
//! This crate is the heart of chainlog. It provides:
//! - The [`Ledger`] trait boundary served by the HTTP gateway
//! - [`MemoryLedger`], a single-process in-memory ledger with long-poll reads
//! - The [`LedgerError`] taxonomy shared with the wire protocol

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use memory::{MemoryLedger, DEFAULT_NETWORK_TYPE};
pub use traits::Ledger;
