use std::time::Duration;

use async_trait::async_trait;
use chainlog_crypto::HashChainVerifier;
use chainlog_protocol::headers::NETWORK_SEED;
use chainlog_protocol::{
    decode_sequenced, decode_status, encode_append_body, endpoints, AppendResponse,
    AppendStatus, ErrorResponse, ReadResponse, StatusResponse,
};
use chainlog_types::{
    AppendRequest, AppendResult, NetworkSeed, ReadRequest, ReadResult, ServerStatus,
};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP client for a chainlog server.
///
/// Every transaction received is re-verified: its hash, its position, and its
/// state-hash link to the transaction before it in the same response.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    config: ClientConfig,
}

/// Reads transactions; implemented by [`Client`] and consumed by
/// [`crate::Scanner`].
#[async_trait]
pub trait TransactionReader: Send + Sync {
    async fn read_transactions(
        &self,
        req: ReadRequest,
        deadline: Option<Instant>,
    ) -> ClientResult<ReadResult>;
}

impl Client {
    /// Client for the server at `base_url` (e.g. `http://127.0.0.1:4000`).
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_config(base_url, ClientConfig::default())
    }

    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.call_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Read transactions starting at `req.index`.
    ///
    /// With a deadline, half of the remaining time is offered to the server
    /// as long-poll timeout, leaving the rest for the round trip. Without
    /// one, the configured poll timeout is used and the call is bounded by
    /// poll plus call timeout. A non-positive `req.count` asks for the
    /// configured `max_count`.
    pub async fn read_transactions(
        &self,
        req: ReadRequest,
        deadline: Option<Instant>,
    ) -> ClientResult<ReadResult> {
        let now = Instant::now();
        let (poll, budget) = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now);
                (remaining / 2, remaining)
            }
            None => (
                self.config.poll_timeout,
                self.config.poll_timeout + self.config.call_timeout,
            ),
        };
        let count = if req.count <= 0 {
            self.config.max_count
        } else {
            req.count
        };

        let url = format!(
            "{}?max_count={count}&timeout={}",
            self.url(&endpoints::read_path(req.index)),
            poll.as_nanos()
        );
        debug!(index = req.index, count, ?poll, "reading transactions");
        let request = with_seed(self.http.get(url), &req.seed).timeout(budget);
        let response = send_checked(request).await?;
        let server_seed = response_seed(response.headers())?;
        if !req.seed.accepts(&server_seed) {
            return Err(ClientError::NetworkSeedMismatch(server_seed));
        }

        let body: ReadResponse = decode_body(response).await?;
        if body.first_index != req.index {
            return Err(ClientError::Discontinuity {
                expected: req.index,
                actual: body.first_index,
            });
        }
        let transactions = decode_sequenced(&body.transactions)?;
        if transactions.len() as i64 > count {
            return Err(ClientError::Protocol(format!(
                "asked for at most {count} transactions, got {}",
                transactions.len()
            )));
        }
        if let Some(first) = transactions.first() {
            if first.index != req.index {
                return Err(ClientError::Discontinuity {
                    expected: req.index,
                    actual: first.index,
                });
            }
        }
        HashChainVerifier::verify_links(None, &transactions)?;

        Ok(ReadResult {
            seed: server_seed,
            transactions,
        })
    }

    /// Append transactions and wait until they are sequenced.
    ///
    /// Missing hashes are computed before sending. Without a deadline the
    /// call is bounded by append plus call timeout.
    pub async fn append_transactions(
        &self,
        req: AppendRequest,
        deadline: Option<Instant>,
    ) -> ClientResult<AppendResult> {
        let (server_seed, body) = self.post_append(&req, deadline, false).await?;
        if body.status != AppendStatus::Sequenced {
            return Err(ClientError::Protocol(format!(
                "expected a sequenced append, got {:?}",
                body.status
            )));
        }
        let last_index = body
            .last_index
            .ok_or_else(|| ClientError::Protocol("append response lacks last_index".into()))?;
        Ok(AppendResult {
            seed: server_seed,
            last_index,
        })
    }

    /// Hand transactions to the server without waiting for them to be
    /// sequenced. Success only means the server accepted the batch.
    pub async fn append_transactions_async(
        &self,
        req: AppendRequest,
        deadline: Option<Instant>,
    ) -> ClientResult<()> {
        let (_, body) = self.post_append(&req, deadline, true).await?;
        if body.status != AppendStatus::Pending {
            return Err(ClientError::Protocol(format!(
                "expected a pending append, got {:?}",
                body.status
            )));
        }
        Ok(())
    }

    async fn post_append(
        &self,
        req: &AppendRequest,
        deadline: Option<Instant>,
        async_append: bool,
    ) -> ClientResult<(NetworkSeed, AppendResponse)> {
        let budget = self.budget(
            deadline,
            self.config.append_timeout + self.config.call_timeout,
        );
        let payload = encode_append_body(&req.transactions)?;
        let mut url = self.url(endpoints::TRANSACTIONS);
        if async_append {
            url.push_str("?async=true");
        }

        debug!(count = req.transactions.len(), async_append, "appending transactions");
        let request = with_seed(self.http.post(url), &req.seed)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .timeout(budget);
        let response = send_checked(request).await?;
        let server_seed = response_seed(response.headers())?;
        let body: AppendResponse = decode_body(response).await?;
        Ok((server_seed, body))
    }

    /// Fetch the server's status, bounded by the call timeout by default.
    pub async fn server_status(&self, deadline: Option<Instant>) -> ClientResult<ServerStatus> {
        let budget = self.budget(deadline, self.config.call_timeout);
        let request = self.http.get(self.url(endpoints::STATUS)).timeout(budget);
        let response = send_checked(request).await?;
        let body: StatusResponse = decode_body(response).await?;
        Ok(decode_status(&body)?)
    }

    fn budget(&self, deadline: Option<Instant>, default: Duration) -> Duration {
        deadline.map_or(default, |d| d.saturating_duration_since(Instant::now()))
    }
}

#[async_trait]
impl TransactionReader for Client {
    async fn read_transactions(
        &self,
        req: ReadRequest,
        deadline: Option<Instant>,
    ) -> ClientResult<ReadResult> {
        Client::read_transactions(self, req, deadline).await
    }
}

fn with_seed(request: RequestBuilder, seed: &NetworkSeed) -> RequestBuilder {
    if seed.is_empty() {
        request
    } else {
        request.header(NETWORK_SEED, seed.to_hex())
    }
}

fn response_seed(headers: &HeaderMap) -> ClientResult<NetworkSeed> {
    let Some(value) = headers.get(NETWORK_SEED) else {
        return Ok(NetworkSeed::empty());
    };
    let text = value
        .to_str()
        .map_err(|e| ClientError::Protocol(format!("invalid network seed header: {e}")))?;
    NetworkSeed::from_hex(text)
        .map_err(|e| ClientError::Protocol(format!("invalid network seed header: {e}")))
}

/// Send a request, turning any non-200 response into the matching error.
async fn send_checked(request: RequestBuilder) -> ClientResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    // An unreadable seed on an error response is not worth failing over.
    let seed = response_seed(response.headers()).unwrap_or_default();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::BadRequest(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::PRECONDITION_FAILED => ClientError::NetworkSeedMismatch(seed),
        StatusCode::INTERNAL_SERVER_ERROR => ClientError::Server(message),
        other => ClientError::Unexpected {
            status: other.as_u16(),
            message,
        },
    })
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::Protocol(format!("failed to decode response: {e}")))
}
