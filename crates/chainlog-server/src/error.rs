use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chainlog_ledger::LedgerError;
use chainlog_protocol::{headers, ErrorResponse};
use chainlog_types::NetworkSeed;
use thiserror::Error;

/// Errors starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A failed request, rendered as a status code and `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    seed: Option<NetworkSeed>,
}

impl ApiError {
    /// Error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            seed: None,
        }
    }

    /// 400 with `context` prefixed to the cause.
    pub fn bad_request(context: &str, err: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("{context}: {err}"))
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Map a ledger failure, prefixing its message with `context`.
    pub fn from_ledger(context: &str, err: LedgerError) -> Self {
        let message = format!("{context}: {err}");
        match err {
            LedgerError::BadRequest(_) => Self::new(StatusCode::BAD_REQUEST, message),
            LedgerError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, message),
            LedgerError::NetworkSeedMismatch(seed) => Self {
                status: StatusCode::PRECONDITION_FAILED,
                message,
                seed: Some(seed),
            },
            LedgerError::Internal(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, message),
        }
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message sent in the JSON body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response();
        if let Some(seed) = self.seed {
            if let Ok(value) = HeaderValue::from_str(&seed.to_hex()) {
                response
                    .headers_mut()
                    .insert(headers::NETWORK_SEED, value);
            }
        }
        response
    }
}
