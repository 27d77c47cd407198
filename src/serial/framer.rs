//! # Block Framer
//!
//! Splits the raw serial byte stream into telemetry blocks.
//!
//! Blocks are delimited by a literal dash line. Bytes after the last
//! separator stay pending until the next separator arrives, so a block that
//! straddles two reads (or a multi-byte label character such as `²` or `°`)
//! is reassembled before decoding.

use bytes::{Buf, BytesMut};
use tracing::warn;

/// Literal separator between telemetry blocks
pub const BLOCK_SEPARATOR: &[u8] = b"-----------------------";

/// Accumulates serial bytes and yields complete text blocks
#[derive(Debug)]
pub struct BlockFramer {
    pending: BytesMut,
    max_pending: usize,
}

impl BlockFramer {
    /// Create a framer that holds at most `max_pending` unterminated bytes
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(max_pending),
            max_pending: max_pending.max(BLOCK_SEPARATOR.len()),
        }
    }

    /// Feed newly read bytes and collect every completed block
    ///
    /// Blocks are decoded lossily: invalid UTF-8 is replaced, never an error.
    /// If the unterminated tail grows past the limit it is flushed as a block
    /// of its own.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut blocks = Vec::new();
        while let Some(pos) = find(&self.pending, BLOCK_SEPARATOR) {
            let block = self.pending.split_to(pos);
            self.pending.advance(BLOCK_SEPARATOR.len());
            blocks.push(String::from_utf8_lossy(&block).into_owned());
        }

        if self.pending.len() > self.max_pending {
            warn!(
                "No block separator in {} pending bytes, flushing as one block",
                self.pending.len()
            );
            blocks.push(self.take_pending());
        }

        blocks
    }

    /// Number of bytes waiting for a separator
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Flush whatever is pending as a final block
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.take_pending())
        }
    }

    fn take_pending(&mut self) -> String {
        let block = self.pending.split();
        String::from_utf8_lossy(&block).into_owned()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: &str = "-----------------------";

    #[test]
    fn test_splits_on_separator() {
        let mut framer = BlockFramer::new(4096);
        let input = format!("{SEP}\nSENSOR DATA\nAlt: 1.0\n{SEP}\nSENSOR DATA\nAlt: 2.0\n{SEP}");

        let blocks = framer.push(input.as_bytes());

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "");
        assert_eq!(blocks[1], "\nSENSOR DATA\nAlt: 1.0\n");
        assert_eq!(blocks[2], "\nSENSOR DATA\nAlt: 2.0\n");
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_block_split_across_reads_is_reassembled() {
        let mut framer = BlockFramer::new(4096);

        assert!(framer.push(b"SENSOR DATA\nTemp: 2").is_empty());
        assert!(framer.push(b"3.5\nAlt: 10").is_empty());
        let blocks = framer.push(format!("0.0\n{SEP}").as_bytes());

        assert_eq!(blocks, vec!["SENSOR DATA\nTemp: 23.5\nAlt: 100.0\n".to_string()]);
    }

    #[test]
    fn test_separator_split_across_reads() {
        let mut framer = BlockFramer::new(4096);

        assert!(framer.push(b"Alt: 5.0\n-----------").is_empty());
        let blocks = framer.push(b"------------\nnext");

        assert_eq!(blocks, vec!["Alt: 5.0\n".to_string()]);
        assert_eq!(framer.finish().as_deref(), Some("\nnext"));
    }

    #[test]
    fn test_multibyte_label_split_across_reads() {
        let mut framer = BlockFramer::new(4096);
        let text = "Accel (m/s²): 1.0, 2.0, 3.0\n".as_bytes();
        let cut = text.iter().position(|&b| b == 0xC2).unwrap() + 1;

        assert!(framer.push(&text[..cut]).is_empty());
        framer.push(&text[cut..]);
        let blocks = framer.push(SEP.as_bytes());

        assert_eq!(blocks, vec!["Accel (m/s²): 1.0, 2.0, 3.0\n".to_string()]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut framer = BlockFramer::new(4096);
        let mut input = b"Temp: 1\xFF2.0\n".to_vec();
        input.extend_from_slice(SEP.as_bytes());

        let blocks = framer.push(&input);

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].contains('\u{FFFD}'));
    }

    #[test]
    fn test_oversized_tail_is_flushed() {
        let mut framer = BlockFramer::new(64);

        let blocks = framer.push(&[b'x'; 100]);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 100);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_finish_on_empty_framer() {
        let mut framer = BlockFramer::new(64);
        assert_eq!(framer.finish(), None);
    }
}
