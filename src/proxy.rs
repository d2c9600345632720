//! Correlated JSON-RPC proxy over a persistent netstring TCP connection.
//!
//! [`JsonRpcProxy`] owns one socket and one sequence counter, so only one
//! request may be in flight at a time per instance. Concurrent use from
//! multiple callers requires external serialization or one proxy per
//! caller. All I/O is blocking; every socket operation may block up to the
//! configured timeout.

use std::time::Duration;

use serde_json::Value;

use crate::protocol::error::{Result, RpcError};
use crate::protocol::jsonrpc::{self, JsonRpcRequest, RequestId};
use crate::transport::netstring;
use crate::transport::tcp::Connection;

/// Protocol version sent and expected by default.
pub const DEFAULT_VERSION: &str = jsonrpc::VERSION;

/// Default connect/read/write timeout (60 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of reconnect-and-resend cycles before a request fails.
pub const DEFAULT_RETRIES: u32 = 5;

/// The sequence counter wraps back to 1 once it passes this ceiling.
const SEQUENCE_CEILING: u64 = 1_000_000;

/// Bounded request-id counter.
///
/// Increments before each use and wraps to 1 past [`SEQUENCE_CEILING`], so
/// 0 is never emitted as a live id. Lifetime is tied to the owning proxy.
#[derive(Debug)]
struct SequenceId {
    last: u64,
}

impl SequenceId {
    fn new() -> Self {
        Self { last: 1 }
    }

    fn next(&mut self) -> RequestId {
        self.last += 1;
        if self.last > SEQUENCE_CEILING {
            self.last = 1;
        }
        self.last
    }
}

/// A JSON-RPC 2.0 client proxy speaking netstring framing over TCP.
///
/// The proxy connects on construction and persists across many
/// request/notify calls. Transport failures and stale replies are absorbed
/// by a bounded reconnect-and-resend loop; protocol violations and
/// peer-reported errors surface immediately.
///
/// # Example
///
/// ```no_run
/// use jsonrpc_ns::JsonRpcProxy;
/// use serde_json::json;
///
/// # fn main() -> jsonrpc_ns::Result<()> {
/// let mut proxy = JsonRpcProxy::connect("127.0.0.1", 9099)?;
/// let result = proxy.request("compute", json!({"n": 100}))?;
/// proxy.notify("log", json!({"event": "computed"}))?;
/// proxy.close();
/// # Ok(())
/// # }
/// ```
pub struct JsonRpcProxy {
    host: String,
    port: u16,
    version: String,
    timeout: Duration,
    seq: SequenceId,
    conn: Connection,
}

impl JsonRpcProxy {
    /// Connects with the default version ("2.0") and timeout (60 s).
    ///
    /// # Errors
    ///
    /// The initial connect failure propagates to the caller; no retry
    /// happens during construction.
    pub fn connect(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::connect_with(host, port, DEFAULT_VERSION, DEFAULT_TIMEOUT)
    }

    /// Connects with an explicit protocol version and socket timeout.
    pub fn connect_with(
        host: impl Into<String>,
        port: u16,
        version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let host = host.into();
        let conn = Connection::connect(&host, port, timeout)?;
        Ok(Self {
            host,
            port,
            version: version.into(),
            timeout,
            seq: SequenceId::new(),
            conn,
        })
    }

    /// Issues a correlated request with the default retry budget.
    pub fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        self.request_with_retries(method, params, DEFAULT_RETRIES)
    }

    /// Issues a correlated request with an explicit retry budget.
    ///
    /// Each attempt draws a fresh id, transmits one frame and reads one
    /// reply. Retryable failures (transport errors, stale replies) consume
    /// one unit of budget, trigger a reconnect and re-run the whole
    /// attempt; a failed reconnect is logged and absorbed so the budget,
    /// not the reconnect, governs termination. Fatal protocol violations
    /// and peer-reported errors surface immediately regardless of budget.
    ///
    /// # Arguments
    ///
    /// * `method` - Name of the remote method to invoke
    /// * `params` - Parameter values, any JSON value
    /// * `retries` - How many reconnect-and-resend cycles to attempt after
    ///   the first failure; `0` means a single attempt
    ///
    /// # Returns
    ///
    /// The `result` value echoed by the peer.
    pub fn request_with_retries(
        &mut self,
        method: &str,
        params: Value,
        retries: u32,
    ) -> Result<Value> {
        let mut budget = retries;
        loop {
            let err = match self.attempt(method, &params) {
                Ok(result) => return Ok(result),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => err,
            };

            if budget == 0 {
                tracing::warn!("retry budget exhausted: {err}");
                return Err(RpcError::RequestFailure(
                    "Retries exceeded. Request failed.".into(),
                ));
            }
            budget -= 1;
            tracing::warn!("request attempt failed ({budget} retries left): {err}");

            if let Err(err) = self.reconnect() {
                // absorbed: the budget, not the reconnect, decides when to stop
                tracing::warn!("reconnect failed: {err}");
            }
        }
    }

    /// One full request attempt: encode, transmit, read, validate.
    fn attempt(&mut self, method: &str, params: &Value) -> Result<Value> {
        let id = self.seq.next();
        let message = JsonRpcRequest::request(self.version.as_str(), method, params.clone(), id);
        let frame = netstring::encode(&message.to_bytes()?);

        self.conn.send(&frame)?;

        let len = netstring::read_header(self.conn.reader())?;
        let body = netstring::read_body(self.conn.reader(), len)?;
        netstring::read_terminator(self.conn.reader())?;

        let response = jsonrpc::parse_response(&body)?;
        jsonrpc::validate_response(response, id, &self.version)
    }

    /// Sends a fire-and-forget notification.
    ///
    /// No id is attached and no response is read; success means the bytes
    /// were handed to the transport. A transmit failure closes the socket
    /// and triggers exactly one reconnect-and-resend; if that also fails
    /// the notification is reported as a `RequestFailure`.
    pub fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        let message = JsonRpcRequest::notification(self.version.as_str(), method, params);
        let frame = netstring::encode(&message.to_bytes()?);

        if let Err(err) = self.conn.send(&frame) {
            tracing::debug!("notify send failed, reconnecting once: {err}");
            self.conn.close();
            let resend = match self.reconnect() {
                Ok(()) => self.conn.send(&frame),
                Err(err) => Err(err),
            };
            if let Err(err) = resend {
                tracing::debug!("notify resend failed: {err}");
                return Err(RpcError::RequestFailure("Failed to send.".into()));
            }
        }
        Ok(())
    }

    /// Destroys and recreates the socket in place.
    ///
    /// The proxy identity and its sequence counter are unchanged.
    fn reconnect(&mut self) -> Result<()> {
        self.conn.close();
        self.conn = Connection::connect(&self.host, self.port, self.timeout)?;
        Ok(())
    }

    /// Releases the connection. The proxy cannot be used afterwards.
    pub fn close(&mut self) {
        self.conn.close();
    }

    /// The protocol version this proxy sends and expects.
    pub fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_above_zero() {
        let mut seq = SequenceId::new();
        assert_eq!(seq.next(), 2);
    }

    #[test]
    fn test_sequence_strictly_increases() {
        let mut seq = SequenceId::new();
        let a = seq.next();
        let b = seq.next();
        let c = seq.next();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_sequence_wraps_at_ceiling() {
        let mut seq = SequenceId { last: SEQUENCE_CEILING - 1 };
        assert_eq!(seq.next(), SEQUENCE_CEILING);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next(), 2);
    }

    #[test]
    fn test_sequence_never_emits_zero() {
        let mut seq = SequenceId { last: SEQUENCE_CEILING };
        for _ in 0..3 {
            assert_ne!(seq.next(), 0);
        }
    }
}
