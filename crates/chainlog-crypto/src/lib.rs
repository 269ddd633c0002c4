//! Hashing primitives for chainlog.
//!
//! Provides the SHA-256 transaction hash, the cumulative state-hash chain
//! that makes the ledger tamper-evident, and verification of both.
//!
//! The transaction hash is `SHA256(type ++ data)` with no delimiter between
//! the fields. Different `(type, data)` splits of the same bytes hash the
//! same; the wire format depends on this exact construction, so it is kept.

pub mod chain;
pub mod hasher;

pub use chain::{chain_hash, ChainError, HashChainVerifier, StateChain};
pub use hasher::{transaction_hash, verify_transaction_hash, HashError};
