//! JSON-RPC 2.0 Message Types
//!
//! This module builds outbound JSON-RPC messages and validates inbound
//! responses.
//!
//! # JSON-RPC 2.0 Compliance
//!
//! - Request format: `{"jsonrpc": "2.0", "method": "...", "params": ..., "id": ...}`
//! - Notification format: the same with the `id` member omitted entirely
//! - Response format: `{"jsonrpc": "2.0", "id": ..., "result": ...}` or
//!   `{"jsonrpc": "2.0", "id": ..., "error": {"code": ..., "message": "..."}}`
//!
//! Responses are validated by key presence on the parsed JSON object, in a
//! fixed order: `jsonrpc` present, `jsonrpc` matches, `id` present, `id`
//! matches the in-flight request, then exactly one of `result`/`error`.
//! The order matters because each check maps to a different failure
//! category (see [`RpcError`]).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::protocol::error::{Result, RpcError};

/// The protocol version this crate speaks by default.
pub const VERSION: &str = "2.0";

/// Correlation identifier attached to requests.
pub type RequestId = u64;

/// A JSON-RPC 2.0 request or notification.
///
/// A notification is a request without an `id`; the member is omitted from
/// the serialized document rather than set to `null`, so the peer never
/// replies to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// Protocol version string (normally "2.0")
    pub jsonrpc: String,
    /// Name of the method to invoke
    pub method: String,
    /// Parameter values (array, object, or any JSON value)
    pub params: Value,
    /// Correlation identifier; `None` for notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl JsonRpcRequest {
    /// Creates a correlated request carrying the given id.
    pub fn request(
        version: impl Into<String>,
        method: impl Into<String>,
        params: Value,
        id: RequestId,
    ) -> Self {
        Self {
            jsonrpc: version.into(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Creates a fire-and-forget notification (no id, no reply expected).
    pub fn notification(
        version: impl Into<String>,
        method: impl Into<String>,
        params: Value,
    ) -> Self {
        Self {
            jsonrpc: version.into(),
            method: method.into(),
            params,
            id: None,
        }
    }

    /// Serializes the message to a compact JSON document.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Parses a fully read frame payload as a JSON object.
///
/// A parse failure or a non-object payload is a protocol violation, never
/// retried.
pub fn parse_response(body: &[u8]) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RpcError::BadResponse(format!("Invalid JSON payload: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RpcError::BadResponse(format!(
            "Invalid response: expected object, got {other}"
        ))),
    }
}

/// Validates a parsed response against the in-flight request.
///
/// Checks run in a fixed order and short-circuit at the first failure:
/// version present, version matches, id present, id matches, exactly one
/// of `result`/`error`. An id mismatch yields a retryable
/// [`RpcError::StaleResponse`]; every other violation is a fatal
/// [`RpcError::BadResponse`]. A well-formed `error` object yields the
/// terminal [`RpcError::ResponseError`].
///
/// # Arguments
///
/// * `response` - The parsed response object
/// * `expected_id` - The id sent with the request being correlated
/// * `version` - The protocol version the proxy was configured with
///
/// # Returns
///
/// The `result` value on success.
pub fn validate_response(
    mut response: Map<String, Value>,
    expected_id: RequestId,
    version: &str,
) -> Result<Value> {
    let Some(got_version) = response.get("jsonrpc") else {
        return Err(RpcError::BadResponse("Missing 'jsonrpc' version".into()));
    };
    if got_version.as_str() != Some(version) {
        let got = got_version
            .as_str()
            .map(str::to_owned)
            .unwrap_or_else(|| got_version.to_string());
        return Err(RpcError::BadResponse(format!(
            "Bad jsonrpc version. Got {got}, expects {version}"
        )));
    }

    let Some(id) = response.get("id") else {
        return Err(RpcError::BadResponse("Missing 'id'".into()));
    };
    if id.as_u64() != Some(expected_id) {
        return Err(RpcError::StaleResponse {
            expected: expected_id,
            got: id.clone(),
        });
    }

    match (response.remove("result"), response.remove("error")) {
        (Some(result), None) => Ok(result),
        (None, Some(error)) => Err(peer_error(&error)),
        _ => Err(RpcError::BadResponse(format!(
            "Invalid response: {}",
            Value::Object(response)
        ))),
    }
}

/// Converts a peer-supplied `error` member into the matching error variant.
///
/// An object carrying both `code` and `message` is an application-level
/// failure reported by the remote peer; anything else is a protocol
/// violation on the peer's side.
fn peer_error(error: &Value) -> RpcError {
    let Some(object) = error.as_object() else {
        return RpcError::BadResponse(format!("Bad error object: {error}"));
    };
    let Some(code) = object.get("code") else {
        return RpcError::BadResponse("Bad error object: missing code".into());
    };
    let Some(message) = object.get("message") else {
        return RpcError::BadResponse("Bad error object: missing message".into());
    };
    let Some(code) = code.as_i64() else {
        return RpcError::BadResponse(format!("Bad error object: non-integer code {code}"));
    };
    let message = message
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| message.to_string());
    RpcError::ResponseError { code, message }
}
