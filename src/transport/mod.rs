//! Netstring Transport Layer
//!
//! This module provides the wire framing codec and the blocking TCP
//! connection used to carry JSON-RPC messages.
//!
//! # Wire Format
//!
//! Every message travels as a netstring-style frame:
//!
//! ```text
//! <decimal ASCII length> ':' <payload bytes> ','
//! ```
//!
//! The payload is a compact UTF-8 JSON document. The trailing comma is the
//! frame terminator and is checked explicitly after the payload has been
//! fully consumed.
//!
//! # Components
//!
//! - [`netstring`] - pure encode/decode of the framing, no I/O state
//! - [`tcp`] - the [`Connection`](tcp::Connection) owning the socket handle
//!
//! All frames are capped at 100 MB to prevent memory exhaustion.

pub mod netstring;
pub mod tcp;

pub use tcp::Connection;

use crate::protocol::error::RpcError;

/// Map IO errors to appropriate RpcError variants
///
/// Timeouts map to `Timeout`; everything else, including connection resets
/// and truncated streams, maps to `Connection`. Both categories feed the
/// retry branch of the proxy.
pub(crate) fn map_io_error(err: std::io::Error, context: &str) -> RpcError {
    match err.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
            RpcError::Timeout(context.to_string())
        }
        std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::ConnectionAborted
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::UnexpectedEof => {
            RpcError::Connection(format!("{context}: connection lost ({err})"))
        }
        _ => RpcError::Connection(format!("{context}: {err}")),
    }
}
