//! Line-based codec for tokio.
//!
//! Reads and writes newline-terminated UTF-8 lines. Decoded items have the
//! terminator stripped; encoded items get `\r\n` appended.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Newline-delimited line codec with a length guard.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let text = std::str::from_utf8(&line).map_err(|e| {
                error::ProtocolError::InvalidUtf8 {
                    byte_pos: e.valid_up_to(),
                }
            })?;

            Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            // Check if partial line already exceeds limit
            if src.len() > self.max_len {
                return Err(error::ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("alice has logged on.\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("alice has logged on.".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_newline_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("#quit\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("#quit".to_string()));
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("no newline yet");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, None);

        buf.extend_from_slice(b" here\n");
        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("no newline yet here".to_string()));
    }

    #[test]
    fn test_decode_two_lines_in_one_read() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("one\ntwo\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("one".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("two".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_too_long() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(error::ProtocolError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_decode_partial_overflow_detected_early() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("0123456789abcdef");

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(error::ProtocolError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"abc\xff\n"[..]);

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(error::ProtocolError::InvalidUtf8 { byte_pos: 3 })
        ));
    }

    #[test]
    fn test_encode_appends_terminator() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("bob> hi".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"bob> hi\r\n");
    }
}
