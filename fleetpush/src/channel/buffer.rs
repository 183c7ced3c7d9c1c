//! Output buffer with tail-only prompt search.
//!
//! Device output can be long (a full `show version` or a large config push),
//! but the prompt is always at the end, so only the last `search_depth` bytes
//! are scanned for it.

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Accumulates device output with ANSI escape sequences removed.
pub struct PatternBuffer {
    /// Cleaned output collected since the last `take()`.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Escape parser, kept across chunks so a sequence split over two
    /// reads is still removed.
    parser: Parser,
}

impl PatternBuffer {
    /// Create a new buffer that searches the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Append raw channel data, dropping escape and control sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = Printable {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Search only the tail of the buffer for the pattern.
    pub fn search_tail(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        pattern.find(self.tail())
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Like [`tail_contains`](Self::tail_contains), but the first line is
    /// never searched.
    ///
    /// The first line of a command's output is its echo, which can look like
    /// a prompt on its own (`banner motd #`) until its line break arrives.
    pub fn tail_contains_after_echo(&self, pattern: &Regex) -> bool {
        let Some(eol) = memchr::memchr(b'\n', &self.buffer) else {
            return false;
        };
        let start = (eol + 1).max(self.tail_start());
        pattern.is_match(&self.buffer[start..])
    }

    fn tail_start(&self) -> usize {
        self.buffer.len().saturating_sub(self.search_depth)
    }

    fn tail(&self) -> &[u8] {
        &self.buffer[self.tail_start()..]
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

}

impl std::fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.buffer.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

/// vte performer that keeps printable text and line control characters.
struct Printable<'a> {
    out: &'a mut Vec<u8>,
}

impl Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::compile_prompt_pattern;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.take(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mR1#\x1b[0m");
        assert_eq!(buffer.take(), b"R1#");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"line\r\n\x1b[");
        buffer.extend(b"1mR1#");
        assert_eq!(buffer.take(), b"line\r\nR1#");
    }

    #[test]
    fn test_tail_search() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nrouter#");

        let pattern = Regex::new(r"router#").unwrap();
        assert!(buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_tail_search_not_in_tail() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"router#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"router#").unwrap();
        assert!(buffer.search_tail(&pattern).is_none());
    }

    #[test]
    fn test_echo_that_looks_like_a_prompt() {
        let prompt = compile_prompt_pattern(r"^[\w.\-@()/: ]{1,63}#").unwrap();
        let mut buffer = PatternBuffer::new(100);

        buffer.extend(b"banner motd #");
        assert!(buffer.tail_contains(&prompt));
        assert!(!buffer.tail_contains_after_echo(&prompt));

        buffer.extend(b"\r\nEnter TEXT message.  End with the character '#'.\r\n");
        assert!(!buffer.tail_contains_after_echo(&prompt));

        buffer.extend(b"R1(config)#");
        assert!(buffer.tail_contains_after_echo(&prompt));
    }

    #[test]
    fn test_after_echo_respects_search_depth() {
        let prompt = Regex::new(r"router#").unwrap();
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"show run\nrouter#");
        buffer.extend(&[b'x'; 100]);
        assert!(!buffer.tail_contains_after_echo(&prompt));
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), b"test data");
        assert!(buffer.take().is_empty());
    }
}
