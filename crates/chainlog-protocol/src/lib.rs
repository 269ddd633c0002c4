//! Wire protocol for chainlog.
//!
//! Defines the HTTP routes, headers, JSON message types, and the encoding of
//! transactions exchanged between chainlog clients and servers. Decoding a
//! transaction always re-verifies its hash, so corrupted input never gets
//! past this layer.

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;

pub use codec::{
    decode_append_body, decode_sequenced, decode_status, decode_unsequenced, encode_append_body,
    encode_sequenced, encode_status, encode_unsequenced,
};
pub use endpoint::{endpoints, headers, LEDGER_VERSION};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    AppendBody, AppendResponse, AppendStatus, EncodedSequencedTransaction,
    EncodedUnsequencedTransaction, ErrorResponse, ReadResponse, StatusResponse,
};
