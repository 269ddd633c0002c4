use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chainlog_crypto::transaction_hash;
use chainlog_types::{NetworkSeed, SequencedTransaction, ServerStatus, UnsequencedTransaction};

use crate::endpoint::LEDGER_VERSION;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{
    AppendBody, EncodedSequencedTransaction, EncodedUnsequencedTransaction, StatusResponse,
};

/// Decode base64 data and check it against the claimed hex hash.
///
/// The comparison is on the hex text, so any change to the hash field,
/// including one that makes it invalid hex, is reported as a mismatch.
fn decode_verified(
    index: usize,
    tx_type: &str,
    data: &str,
    hash: &str,
) -> ProtocolResult<(Vec<u8>, [u8; 32])> {
    let data = STANDARD
        .decode(data)
        .map_err(|e| ProtocolError::InvalidData {
            index,
            reason: e.to_string(),
        })?;
    let computed = transaction_hash(tx_type, &data);
    if hash != hex::encode(computed) {
        return Err(ProtocolError::HashMismatch { index });
    }
    Ok((data, computed))
}

/// Encode transactions for an append request, computing missing hashes.
pub fn encode_unsequenced(txs: &[UnsequencedTransaction]) -> Vec<EncodedUnsequencedTransaction> {
    txs.iter()
        .map(|tx| {
            let hash = if tx.has_hash() {
                hex::encode(&tx.hash)
            } else {
                hex::encode(transaction_hash(&tx.tx_type, &tx.data))
            };
            EncodedUnsequencedTransaction {
                tx_type: tx.tx_type.clone(),
                data: STANDARD.encode(&tx.data),
                hash,
            }
        })
        .collect()
}

/// Decode transactions of an append request, verifying every hash.
pub fn decode_unsequenced(
    txs: &[EncodedUnsequencedTransaction],
) -> ProtocolResult<Vec<UnsequencedTransaction>> {
    txs.iter()
        .enumerate()
        .map(|(i, tx)| {
            let (data, hash) = decode_verified(i, &tx.tx_type, &tx.data, &tx.hash)?;
            Ok(UnsequencedTransaction {
                tx_type: tx.tx_type.clone(),
                data,
                hash: hash.to_vec(),
            })
        })
        .collect()
}

pub fn encode_sequenced(txs: &[SequencedTransaction]) -> Vec<EncodedSequencedTransaction> {
    txs.iter()
        .map(|tx| EncodedSequencedTransaction {
            tx_type: tx.tx_type.clone(),
            index: tx.index,
            timestamp: tx.timestamp,
            data: STANDARD.encode(&tx.data),
            hash: hex::encode(&tx.hash),
            state_hash: hex::encode(&tx.state_hash),
        })
        .collect()
}

/// Decode transactions of a read response, verifying every hash.
pub fn decode_sequenced(
    txs: &[EncodedSequencedTransaction],
) -> ProtocolResult<Vec<SequencedTransaction>> {
    txs.iter()
        .enumerate()
        .map(|(i, tx)| {
            let (data, hash) = decode_verified(i, &tx.tx_type, &tx.data, &tx.hash)?;
            let state_hash =
                hex::decode(&tx.state_hash).map_err(|e| ProtocolError::InvalidHex {
                    index: i,
                    field: "state_hash",
                    reason: e.to_string(),
                })?;
            Ok(SequencedTransaction {
                tx_type: tx.tx_type.clone(),
                index: tx.index,
                timestamp: tx.timestamp,
                data,
                hash: hash.to_vec(),
                state_hash,
            })
        })
        .collect()
}

/// Serialize an append request body.
pub fn encode_append_body(txs: &[UnsequencedTransaction]) -> ProtocolResult<Vec<u8>> {
    let body = AppendBody {
        transactions: encode_unsequenced(txs),
    };
    serde_json::to_vec(&body).map_err(|e| ProtocolError::Json(e.to_string()))
}

/// Parse and verify an append request body.
pub fn decode_append_body(body: &[u8]) -> ProtocolResult<Vec<UnsequencedTransaction>> {
    let body: AppendBody =
        serde_json::from_slice(body).map_err(|e| ProtocolError::Json(e.to_string()))?;
    decode_unsequenced(&body.transactions)
}

pub fn encode_status(status: &ServerStatus) -> StatusResponse {
    StatusResponse {
        network_type: status.network_type.clone(),
        network_seed: status.seed.to_hex(),
        last_index: status.last_index,
        server_time: status.server_time,
        ready: status.ready,
        version: LEDGER_VERSION.to_string(),
        error: None,
    }
}

pub fn decode_status(status: &StatusResponse) -> ProtocolResult<ServerStatus> {
    let seed = NetworkSeed::from_hex(&status.network_seed)
        .map_err(|e| ProtocolError::InvalidSeed(e.to_string()))?;
    Ok(ServerStatus {
        network_type: status.network_type.clone(),
        seed,
        last_index: status.last_index,
        server_time: status.server_time,
        ready: status.ready,
    })
}
