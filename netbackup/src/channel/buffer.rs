//! Capture buffer with tail-limited pattern search.
//!
//! Prompt, pagination and login patterns only ever appear near the end of
//! what a device has sent so far, so searches are limited to the last
//! `search_depth` bytes. For full configuration dumps this keeps every
//! per-chunk check cheap regardless of how much has been captured.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Pager erase: cursor back, blank the marker, cursor back again.
static PAGER_ERASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9]+D[ ]+\x1b\[[0-9]+D").unwrap());

/// Per-session accumulator for device output.
///
/// ANSI escape sequences are stripped as data is appended, so pagination
/// redraws (`ESC[42D` and friends) never reach the saved configuration.
#[derive(Debug)]
pub struct CaptureBuffer {
    /// The accumulated output.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

impl CaptureBuffer {
    /// Create a buffer that searches the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append a chunk, stripping ANSI escape codes.
    ///
    /// Pager erase sequences are dropped along with the blanks they print,
    /// which would otherwise indent the line that follows.
    pub fn extend(&mut self, data: &[u8]) {
        let data = PAGER_ERASE.replace_all(data, &b""[..]);
        let cleaned = strip_ansi_escapes::strip(&data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Search the tail of the buffer, never looking before `from`.
    ///
    /// Returns the match as an absolute byte range into the buffer.
    pub fn search_from(&self, pattern: &Regex, from: usize) -> Option<Range<usize>> {
        let tail_start = self.buffer.len().saturating_sub(self.search_depth);
        let start = from.max(tail_start).min(self.buffer.len());
        pattern
            .find(&self.buffer[start..])
            .map(|m| start + m.start()..start + m.end())
    }

    /// Remove a previously matched region so it cannot match again.
    pub fn consume(&mut self, range: Range<usize>) {
        let end = range.end.min(self.buffer.len());
        let start = range.start.min(end);
        self.buffer.drain(start..end);
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = CaptureBuffer::new(100);
        buffer.extend(b"hostname R1\n");
        assert_eq!(buffer.as_slice(), b"hostname R1\n");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = CaptureBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_pager_erase_leaves_no_indent() {
        let mut buffer = CaptureBuffer::new(100);
        buffer.extend(b"#\n");
        buffer.extend(b"\x1b[16D                \x1b[16D interface Vlan1\n");
        assert_eq!(buffer.as_slice(), b"#\n interface Vlan1\n");
    }

    #[test]
    fn test_search_respects_depth() {
        let mut buffer = CaptureBuffer::new(10);
        buffer.extend(b"<H3C>");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"<H3C>").unwrap();
        assert!(buffer.search_from(&pattern, 0).is_none());
    }

    #[test]
    fn test_search_respects_offset() {
        let mut buffer = CaptureBuffer::new(1000);
        buffer.extend(b"<H3C>display current-configuration\n");
        let offset = buffer.len();
        buffer.extend(b"sysname H3C\n");

        let pattern = Regex::new(r"<H3C>").unwrap();
        assert!(buffer.search_from(&pattern, offset).is_none());
        assert_eq!(buffer.search_from(&pattern, 0), Some(0..5));
    }

    #[test]
    fn test_consume_removes_match() {
        let mut buffer = CaptureBuffer::new(1000);
        buffer.extend(b"line 1\n--More--line 2\n");

        let pattern = Regex::new(r"--More--").unwrap();
        let range = buffer.search_from(&pattern, 0).unwrap();
        buffer.consume(range);

        assert_eq!(buffer.as_slice(), b"line 1\nline 2\n");
        assert!(buffer.search_from(&pattern, 0).is_none());
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = CaptureBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), b"test data");
        assert!(buffer.is_empty());
    }
}
