use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Bad response: {0}")]
    BadResponse(String),

    #[error("RPC error {code}: {message}")]
    ResponseError { code: i64, message: String },

    #[error("Request failed: {0}")]
    RequestFailure(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timed out while {0}")]
    Timeout(String),

    #[error("Stale response: expected id {expected}, got {got}")]
    StaleResponse {
        expected: u64,
        got: serde_json::Value,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RpcError {
    /// Whether the failure may be absorbed by a reconnect-and-resend cycle.
    ///
    /// Transport failures and stale replies are retryable; protocol
    /// violations, peer-reported errors and exhausted budgets are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RpcError::Connection(_) | RpcError::Timeout(_) | RpcError::StaleResponse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;
