//! Blocking TCP connection management.

use std::io::{BufReader, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::protocol::error::{Result, RpcError};
use crate::transport::map_io_error;

/// The proxy's exclusively owned socket handle.
///
/// A `Connection` wraps one stream socket behind a buffered reader so the
/// framing codec can scan for delimiters without single-byte system calls.
/// It is wholesale replaced on reconnect; the old socket is shut down and a
/// new one opened in its place.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use jsonrpc_ns::transport::Connection;
///
/// let mut conn = Connection::connect("127.0.0.1", 9099, Duration::from_secs(60)).unwrap();
/// conn.send(b"12:{\"method\":1},").unwrap();
/// conn.close();
/// ```
pub struct Connection {
    reader: BufReader<TcpStream>,
}

impl Connection {
    /// Opens a new stream socket and connects to `host:port`.
    ///
    /// The address may resolve to multiple socket addresses; each is tried
    /// in turn until one accepts. The timeout applies to the connect itself
    /// and to every subsequent read and write on the stream.
    ///
    /// # Errors
    ///
    /// Returns a retryable connection error if the address cannot be
    /// resolved, no resolved address accepts, or the timeouts cannot be
    /// applied. No retry happens here; that is the proxy's job.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let socket_addrs = (host, port).to_socket_addrs().map_err(|e| {
            RpcError::Connection(format!("Invalid address '{host}:{port}': {e}"))
        })?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            match TcpStream::connect_timeout(&socket_addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout)).map_err(|e| {
                        RpcError::Connection(format!("Failed to set read timeout: {e}"))
                    })?;
                    stream.set_write_timeout(Some(timeout)).map_err(|e| {
                        RpcError::Connection(format!("Failed to set write timeout: {e}"))
                    })?;

                    return Ok(Self {
                        reader: BufReader::new(stream),
                    });
                }
                Err(e) => {
                    last_err = Some(e);
                }
            }
        }

        Err(RpcError::Connection(format!(
            "Failed to connect to {host}:{port}: {}",
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Writes a full frame to the socket and flushes it.
    pub fn send(&mut self, frame: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream
            .write_all(frame)
            .map_err(|e| map_io_error(e, "sending frame"))?;
        stream
            .flush()
            .map_err(|e| map_io_error(e, "flushing stream"))?;
        Ok(())
    }

    /// The buffered read side of the socket, for the framing codec.
    pub fn reader(&mut self) -> &mut BufReader<TcpStream> {
        &mut self.reader
    }

    /// Releases the socket.
    ///
    /// Safe to call on a connection that is already closed or never fully
    /// connected; shutdown failures are ignored.
    pub fn close(&mut self) {
        let _ = self.reader.get_ref().shutdown(Shutdown::Both);
    }
}
