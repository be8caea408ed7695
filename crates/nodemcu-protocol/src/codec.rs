//! Line-based codec for the interpreter's console.
//!
//! The console speaks CRLF-terminated lines in both directions. Commands are
//! echoed back character for character before any output appears, and free-form
//! output (from `dofile` or a reboot) is delimited by the interactive prompt
//! `> ` rather than a line ending, so the terminator is configurable.

use bytes::BytesMut;

/// Line terminator used by the console.
pub const LINE_ENDING: &[u8] = b"\r\n";

/// Interactive prompt printed when the interpreter is ready for input.
pub const PROMPT: &[u8] = b"> ";

/// Typical line length, used to size the buffer.
const INITIAL_CAPACITY: usize = 128;

/// Accumulates received bytes until the buffer ends with a terminator.
#[derive(Debug)]
pub struct LineCodec {
    /// Bytes received since the last complete line.
    buffer: BytesMut,
    /// The terminator that completes a line.
    terminator: Vec<u8>,
}

impl Default for LineCodec {
    fn default() -> Self {
        LineCodec::new(LINE_ENDING)
    }
}

impl LineCodec {
    /// Create a codec that splits on `terminator`.
    pub fn new(terminator: &[u8]) -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            terminator: terminator.to_vec(),
        }
    }

    /// Add received data to the buffer.
    ///
    /// Returns `true` once the buffer ends with the terminator. Callers feed
    /// one byte at a time so that nothing past the terminator is consumed.
    pub fn push(&mut self, data: &[u8]) -> bool {
        self.buffer.extend_from_slice(data);
        self.is_complete()
    }

    /// Whether the buffered data ends with the terminator.
    ///
    /// An empty terminator completes immediately.
    pub fn is_complete(&self) -> bool {
        self.buffer.ends_with(&self.terminator)
    }

    /// Take the buffered line with the terminator stripped.
    ///
    /// Returns `None` if no complete line is buffered.
    pub fn decode_line(&mut self) -> Option<Vec<u8>> {
        if !self.is_complete() {
            return None;
        }
        let mut line = self.buffer.split();
        line.truncate(line.len() - self.terminator.len());
        Some(line.to_vec())
    }

    /// Encode a statement for transmission.
    ///
    /// Appends the CRLF terminator.
    pub fn encode_command(statement: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(statement.len() + LINE_ENDING.len());
        buf.extend_from_slice(statement);
        buf.extend_from_slice(LINE_ENDING);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command() {
        assert_eq!(LineCodec::encode_command(b"file.close()"), b"file.close()\r\n");
    }

    #[test]
    fn test_decode_line() {
        let mut codec = LineCodec::default();
        for &byte in b"true\r" {
            assert!(!codec.push(&[byte]));
        }
        assert!(codec.decode_line().is_none());

        assert!(codec.push(b"\n"));
        assert_eq!(codec.decode_line(), Some(b"true".to_vec()));
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_lone_newline_is_not_a_terminator() {
        let mut codec = LineCodec::default();
        assert!(!codec.push(b"a\nb"));
        assert!(codec.push(b"\r\n"));
        assert_eq!(codec.decode_line(), Some(b"a\nb".to_vec()));
    }

    #[test]
    fn test_prompt_terminator() {
        let mut codec = LineCodec::new(PROMPT);
        assert!(!codec.push(b"hello!\r\n>"));
        assert!(codec.push(b" "));
        assert_eq!(codec.decode_line(), Some(b"hello!\r\n".to_vec()));
    }

    #[test]
    fn test_empty_line() {
        let mut codec = LineCodec::default();
        assert!(codec.push(b"\r\n"));
        assert_eq!(codec.decode_line(), Some(Vec::new()));
    }
}
