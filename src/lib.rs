//! JSON-RPC 2.0 over TCP Netstrings
//!
//! This crate is a client-side implementation of JSON-RPC 2.0 carried over
//! a netstring-style length-prefixed framing on a persistent TCP
//! connection. It issues correlated request/response RPCs and
//! fire-and-forget notifications against a remote service speaking this
//! framing.
//!
//! # Architecture
//!
//! - **Wire format**: `<decimal ASCII length> ':' <JSON payload> ','`
//! - **Serialization**: compact JSON ([`serde_json`])
//! - **I/O model**: synchronous blocking sockets, one request in flight
//!   per proxy
//! - **Recovery**: bounded reconnect-and-resend with no inter-attempt
//!   delay; the retry budget is caller-supplied
//!
//! # Components
//!
//! - [`protocol`] - message types, response validation, error taxonomy
//! - [`transport`] - netstring framing codec and the blocking TCP
//!   connection
//! - [`proxy`] - [`JsonRpcProxy`], the correlation and retry engine
//!
//! # Example
//!
//! ```no_run
//! use jsonrpc_ns::JsonRpcProxy;
//! use serde_json::json;
//!
//! # fn main() -> jsonrpc_ns::Result<()> {
//! // a persistent proxy for many calls
//! let mut proxy = JsonRpcProxy::connect("127.0.0.1", 9099)?;
//! let result = proxy.request("compute", json!({"n": 100}))?;
//! proxy.close();
//!
//! // or a one-shot call that manages the socket for you
//! let result = jsonrpc_ns::request("127.0.0.1:9099", "compute", json!({"n": 100}))?;
//! # Ok(())
//! # }
//! ```

pub mod protocol;
pub mod proxy;
pub mod transport;

pub use protocol::error::{Result, RpcError};
pub use protocol::jsonrpc::{JsonRpcRequest, RequestId};
pub use proxy::JsonRpcProxy;

use serde_json::Value;

/// One-shot JSON-RPC request.
///
/// Creates and destroys a proxy (and its socket) for a single request.
///
/// # Arguments
///
/// * `addr` - `"host:port"` address string
/// * `method` - Name of the remote method to invoke
/// * `params` - Parameter values, any JSON value
pub fn request(addr: &str, method: &str, params: Value) -> Result<Value> {
    let (host, port) = split_addr(addr)?;
    let mut proxy = JsonRpcProxy::connect(host, port)?;
    let result = proxy.request(method, params);
    proxy.close();
    result
}

/// One-shot JSON-RPC notification.
///
/// Creates and destroys a proxy (and its socket) for a single
/// notification.
pub fn notify(addr: &str, method: &str, params: Value) -> Result<()> {
    let (host, port) = split_addr(addr)?;
    let mut proxy = JsonRpcProxy::connect(host, port)?;
    let result = proxy.notify(method, params);
    proxy.close();
    result
}

fn split_addr(addr: &str) -> Result<(&str, u16)> {
    let Some((host, port)) = addr.rsplit_once(':') else {
        return Err(RpcError::Connection(format!(
            "Invalid address '{addr}': expected host:port"
        )));
    };
    let port = port
        .parse()
        .map_err(|e| RpcError::Connection(format!("Invalid address '{addr}': {e}")))?;
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_addr() {
        assert_eq!(split_addr("127.0.0.1:9099").unwrap(), ("127.0.0.1", 9099));
    }

    #[test]
    fn test_split_addr_without_port() {
        let err = split_addr("localhost").unwrap_err();
        match err {
            RpcError::Connection(msg) => assert!(msg.contains("Invalid address")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_split_addr_with_bad_port() {
        let err = split_addr("localhost:ninety").unwrap_err();
        match err {
            RpcError::Connection(msg) => assert!(msg.contains("Invalid address")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
