//! Request framing and EOT-terminated response codec over any byte stream.
//!
//! A request is `<\n{key}\n>` with no terminator. A response is the raw
//! answer followed by a single [`EOT`] byte.

use std::io::{self, BufRead, Write};

use serde_json::Value;

use crate::message::{EOT, REQUEST_CLOSE, REQUEST_OPEN};

/// Builds the request bytes for `key`.
///
/// The key is inserted verbatim: no escaping or length prefix. A key that
/// itself contains `"\n>"` closes the request early on the host side.
pub fn frame(key: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(REQUEST_OPEN.len() + key.len() + REQUEST_CLOSE.len());
    buf.extend_from_slice(REQUEST_OPEN);
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(REQUEST_CLOSE);
    buf
}

/// Frames `key` and writes the whole request to `w`.
pub fn write_request<W: Write>(w: &mut W, key: &str) -> io::Result<()> {
    w.write_all(&frame(key))?;
    w.flush()
}

/// Reads one response from `r`, up to and excluding the [`EOT`] byte.
///
/// Blocks until the terminator arrives. Bytes after the terminator are left
/// unread. Returns [`io::ErrorKind::UnexpectedEof`] if the stream ends first.
pub fn read_response<R: BufRead>(r: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    r.read_until(EOT, &mut buf)?;
    if buf.pop() == Some(EOT) {
        Ok(buf)
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream closed before end-of-transmission byte",
        ))
    }
}

/// Decodes a response body with the terminator already stripped.
///
/// Valid JSON yields the parsed value. Anything else is returned as
/// [`Value::String`] holding the raw text; invalid UTF-8 sequences are
/// replaced with U+FFFD.
pub fn decode(raw: &[u8]) -> Value {
    serde_json::from_slice(raw)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()))
}
