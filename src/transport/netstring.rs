//! Netstring framing codec.
//!
//! Pure encode/decode of the `<len>:<payload>,` wire format. The read side
//! consumes bytes from a buffered stream and reports failures upward; no
//! retry logic lives here.

use std::io::{BufRead, Read};

use crate::protocol::error::{Result, RpcError};
use crate::transport::map_io_error;

/// Maximum accepted frame payload size (100 MB)
pub const MAX_FRAME_SIZE: usize = 100 * 1024 * 1024;

/// Wraps a payload as a netstring frame: `<len>:<payload>,`.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 16);
    frame.extend_from_slice(payload.len().to_string().as_bytes());
    frame.push(b':');
    frame.extend_from_slice(payload);
    frame.push(b',');
    frame
}

/// Reads the length header of the next frame.
///
/// Scans the buffered stream for the colon delimiter, accumulating decimal
/// digits without issuing single-byte reads. Any non-digit byte before the
/// colon, an empty length field, or a length above [`MAX_FRAME_SIZE`] is a
/// fatal `BadResponse`. A stream that closes before delivering any header
/// byte is a retryable connection error.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<usize> {
    let mut length: usize = 0;
    let mut fragment = String::new();
    loop {
        let buf = reader
            .fill_buf()
            .map_err(|e| map_io_error(e, "reading frame header"))?;
        if buf.is_empty() {
            return Err(if fragment.is_empty() {
                RpcError::Connection("No data received".into())
            } else {
                RpcError::Connection("connection closed while reading frame header".into())
            });
        }

        let mut consumed = 0;
        let mut complete = false;
        let mut malformed = None;
        for &byte in buf {
            consumed += 1;
            match byte {
                b':' => {
                    complete = true;
                    break;
                }
                b'0'..=b'9' => {
                    length = length * 10 + usize::from(byte - b'0');
                    fragment.push(byte as char);
                    if length > MAX_FRAME_SIZE {
                        malformed = Some(format!(
                            "Bad netstring: length \"{fragment}\" exceeds {MAX_FRAME_SIZE} byte limit"
                        ));
                        break;
                    }
                }
                other => {
                    malformed = Some(format!(
                        "Bad netstring: invalid length byte {:?} after \"{fragment}\"",
                        other as char
                    ));
                    break;
                }
            }
        }
        reader.consume(consumed);

        if let Some(message) = malformed {
            return Err(RpcError::BadResponse(message));
        }
        if complete {
            if fragment.is_empty() {
                return Err(RpcError::BadResponse("Bad netstring: empty length".into()));
            }
            return Ok(length);
        }
    }
}

/// Reads exactly `len` payload bytes, looping over partial reads.
pub fn read_body<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            RpcError::Connection("connection closed while reading frame body".into())
        } else {
            map_io_error(e, "reading frame body")
        }
    })?;
    Ok(body)
}

/// Confirms the frame terminator.
///
/// Reads one more byte; anything other than a comma, including end of
/// stream, is a fatal `BadResponse`.
pub fn read_terminator<R: Read>(reader: &mut R) -> Result<()> {
    let mut byte = [0u8; 1];
    match reader.read(&mut byte) {
        Ok(0) => Err(RpcError::BadResponse("Bad netstring: missing comma".into())),
        Ok(_) if byte[0] == b',' => Ok(()),
        Ok(_) => Err(RpcError::BadResponse(format!(
            "Bad netstring: missing comma (got {:?})",
            byte[0] as char
        ))),
        Err(e) => Err(map_io_error(e, "reading frame terminator")),
    }
}
