//! Length-prefixed frame scanning.
//!
//! Every message after the handshake travels as a 4-byte big-endian payload
//! length followed by that many bytes. [`FrameScanner`] accumulates raw socket
//! reads and yields complete payloads; it never hands out a partial frame and
//! tolerates arbitrary chunking across reads.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::errors::{IBApiError, Result};
use crate::protocol::{HEADER_LEN, MAX_MSG_LEN};

/// Initial capacity of the scan buffer.
const SCAN_BUFFER_CAPACITY: usize = 8 * 1024;

/// Incremental splitter of a byte stream into frames.
#[derive(Debug)]
pub struct FrameScanner {
    buf: BytesMut,
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScanner {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(SCAN_BUFFER_CAPACITY),
        }
    }

    /// Append freshly received bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Mutable access to the scan buffer, for `AsyncReadExt::read_buf`.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Bytes received but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Take the next complete frame payload.
    ///
    /// Returns `Ok(None)` when more data is needed; nothing is consumed in
    /// that case. A zero-length frame yields an empty payload.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>> {
        if self.buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let len = u32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]) as usize;
        if len > MAX_MSG_LEN {
            return Err(IBApiError::Protocol(format!(
                "frame length {len} exceeds maximum {MAX_MSG_LEN}"
            )));
        }
        if self.buf.len() < HEADER_LEN + len {
            return Ok(None);
        }
        self.buf.advance(HEADER_LEN);
        Ok(Some(self.buf.split_to(len).freeze()))
    }

    /// Take `count` NUL-terminated fields that arrived without a length
    /// prefix (legacy handshake reply).
    ///
    /// Returns `Ok(None)` until all `count` terminators are buffered.
    pub fn next_unframed_fields(&mut self, count: usize) -> Result<Option<Vec<String>>> {
        let mut ends = Vec::with_capacity(count);
        let mut start = 0;
        for _ in 0..count {
            match self.buf[start..].iter().position(|&b| b == 0) {
                Some(offset) => {
                    ends.push(start + offset);
                    start += offset + 1;
                }
                None => return Ok(None),
            }
        }

        let raw = self.buf.split_to(start);
        let mut fields = Vec::with_capacity(count);
        let mut from = 0;
        for end in ends {
            let field = std::str::from_utf8(&raw[from..end])
                .map_err(|e| IBApiError::Decoding(format!("invalid UTF-8 in handshake: {e}")))?;
            fields.push(field.to_string());
            from = end + 1;
        }
        Ok(Some(fields))
    }

    /// Whether the buffered data starts with a length prefix rather than
    /// legacy text. `None` while the buffer is empty.
    pub fn looks_framed(&self) -> Option<bool> {
        // Frame lengths never exceed 0xFFFFFF, so a framed reply always
        // starts with a zero byte while a text reply starts with a digit
        // or a minus sign.
        self.buf.first().map(|&b| b == 0)
    }
}

/// Prefix `payload` with its 4-byte big-endian length.
pub fn encode_frame(payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > MAX_MSG_LEN {
        return Err(IBApiError::Encoding(format!(
            "message too long: {} bytes (max {MAX_MSG_LEN})",
            payload.len()
        )));
    }
    let mut out = BytesMut::with_capacity(HEADER_LEN + payload.len());
    out.put_u32(payload.len() as u32);
    out.extend_from_slice(payload);
    Ok(out)
}
