//! Foundation types for chainlog.
//!
//! Every other chainlog crate depends on `chainlog-types`.
//!
//! # Key Types
//!
//! - [`NetworkSeed`]: Random identifier distinguishing independent ledger instances
//! - [`UnsequencedTransaction`]: A transaction before the ledger assigns it an index
//! - [`SequencedTransaction`]: A transaction written to the ledger, with index and state hash
//! - [`ReadRequest`] / [`AppendRequest`]: Operation inputs shared by server and client
//! - [`ServerStatus`]: Snapshot of a ledger node's state

pub mod error;
pub mod request;
pub mod seed;
pub mod temporal;
pub mod transaction;

pub use error::TypeError;
pub use request::{AppendRequest, AppendResult, ReadRequest, ReadResult, ServerStatus};
pub use seed::NetworkSeed;
pub use temporal::{next_timestamp, unix_nanos};
pub use transaction::{SequencedTransaction, UnsequencedTransaction};
