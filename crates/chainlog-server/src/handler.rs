use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use chainlog_protocol::headers::{LEDGER_VERSION as VERSION_HEADER, NETWORK_SEED};
use chainlog_protocol::{
    decode_append_body, encode_sequenced, encode_status, AppendResponse, ReadResponse,
    LEDGER_VERSION,
};
use chainlog_types::{AppendRequest, NetworkSeed, ReadRequest};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters of a read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReadParams {
    pub max_count: Option<i64>,
    pub metadata_only: bool,
    /// Long-poll timeout in nanoseconds; negative means do not wait.
    pub timeout: Option<i64>,
}

/// Query parameters of an append.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppendParams {
    #[serde(rename = "async")]
    pub async_append: bool,
}

/// Decode the optional seed header. A missing header means no check.
fn request_seed(headers: &HeaderMap) -> Result<NetworkSeed, ApiError> {
    let Some(value) = headers.get(NETWORK_SEED) else {
        return Ok(NetworkSeed::empty());
    };
    let text = value
        .to_str()
        .map_err(|e| ApiError::bad_request("Failed to decode network seed", e))?;
    NetworkSeed::from_hex(text).map_err(|e| ApiError::bad_request("Failed to decode network seed", e))
}

/// Only decimal digits address a transaction; anything else is an unknown route.
fn parse_index(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::not_found(format!("No route for index {raw:?}")));
    }
    raw.parse()
        .map_err(|e| ApiError::bad_request("Failed to parse index", e))
}

fn with_seed(seed: &NetworkSeed, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Ok(value) = HeaderValue::from_str(&seed.to_hex()) {
        response.headers_mut().insert(NETWORK_SEED, value);
    }
    response
}

/// Read handler (`GET /transactions/{index}`).
pub async fn read_handler(
    State(state): State<AppState>,
    Path(index): Path<String>,
    params: Result<Query<ReadParams>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let index = parse_index(&index)?;
    let Query(params) = params.map_err(|e| ApiError::bad_request("Failed to decode query", e))?;
    let seed = request_seed(&headers)?;

    let config = &state.config;
    let count = params
        .max_count
        .unwrap_or(config.default_count)
        .min(config.max_count);
    let poll = params
        .timeout
        .map(|nanos| Duration::from_nanos(nanos.max(0).unsigned_abs()))
        .unwrap_or(config.default_poll_timeout)
        .min(config.poll_limit());
    let deadline = (state.deadline)(poll);

    debug!(index, count, ?poll, "reading transactions");
    let result = state
        .ledger
        .read_transactions(ReadRequest::new(seed, index, count), deadline)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to read transactions", e))?;

    let first_index = result.transactions.first().map_or(index, |tx| tx.index);
    let last_index = result.transactions.last().map_or(index - 1, |tx| tx.index);
    info!(
        first_index,
        last_index,
        metadata_only = params.metadata_only,
        "returning transactions"
    );
    let transactions = if params.metadata_only {
        Vec::new()
    } else {
        encode_sequenced(&result.transactions)
    };
    Ok(with_seed(
        &result.seed,
        Json(ReadResponse {
            first_index,
            transactions,
            last_index,
            error: None,
        }),
    ))
}

/// Append handler (`POST /transactions`).
///
/// With `async=true` the append runs in a detached task and its outcome is
/// only logged.
pub async fn append_handler(
    State(state): State<AppState>,
    params: Result<Query<AppendParams>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request("Failed to decode query", e))?;
    let seed = request_seed(&headers)?;
    let transactions =
        decode_append_body(&body).map_err(|e| ApiError::bad_request("Failed to parse body", e))?;
    let req = AppendRequest::new(seed, transactions);

    if params.async_append {
        debug!(count = req.transactions.len(), "scheduling append");
        let ledger = Arc::clone(&state.ledger);
        tokio::spawn(async move {
            if let Err(e) = ledger.append_transactions(req).await {
                warn!(error = %e, "async append failed");
            }
        });
        return Ok(Json(AppendResponse::pending()).into_response());
    }

    let count = req.transactions.len();
    let result = state
        .ledger
        .append_transactions(req)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to append transactions", e))?;
    info!(count, last_index = result.last_index, "appended transactions");
    Ok(with_seed(
        &result.seed,
        Json(AppendResponse::sequenced(result.last_index)),
    ))
}

/// Status handler (`GET /`).
pub async fn status_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let status = state
        .ledger
        .server_status()
        .await
        .map_err(|e| ApiError::from_ledger("Failed to get status", e))?;
    Ok(with_seed(&status.seed, Json(encode_status(&status))))
}

/// Applied to every response: JSON error bodies, the version header, and the
/// ledger's seed when the handler did not set it.
pub async fn common_headers(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    debug!(%method, %uri, "handling request");

    let mut response = next.run(request).await;
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if !status.is_success() && !is_json {
        // Fallback 404s, 405s and request timeouts come with empty bodies.
        let (status, message) = if status == StatusCode::REQUEST_TIMEOUT {
            (StatusCode::INTERNAL_SERVER_ERROR, "Request timed out".to_string())
        } else {
            (
                status,
                status.canonical_reason().unwrap_or("Error").to_string(),
            )
        };
        response = ApiError::new(status, message).into_response();
    }
    if !response.status().is_success() {
        warn!(%method, %uri, status = response.status().as_u16(), "request failed");
    }

    if !response.headers().contains_key(NETWORK_SEED) {
        match state.ledger.network_seed().await {
            Ok(seed) => {
                if let Ok(value) = HeaderValue::from_str(&seed.to_hex()) {
                    response.headers_mut().insert(NETWORK_SEED, value);
                }
            }
            Err(e) => warn!(error = %e, "failed to look up network seed"),
        }
    }
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(VERSION_HEADER, HeaderValue::from_static(LEDGER_VERSION));
    response
}
