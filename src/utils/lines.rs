//! Line reconstruction over a chunked byte stream.
//!
//! Chunks arrive with arbitrary boundaries. Complete lines are cut on `\n`
//! (dropping one preceding `\r`), the unterminated tail is carried into the
//! next chunk, and a non-empty tail left at end of stream is emitted as the
//! last line. Lines are decoded only once they are complete, so a multi-byte
//! character split across two chunks decodes the same as in one chunk.

use futures::{Stream, StreamExt};

use crate::error::Result;

/// Forward-only reader yielding one decoded line at a time.
pub struct LineReader<S> {
    stream: S,
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to contain no `\n`
    scanned: usize,
    finished: bool,
}

impl<S> LineReader<S>
where
    S: Stream<Item = Result<Vec<u8>>> + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            scanned: 0,
            finished: false,
        }
    }

    /// Next line without its terminator, or `None` once the stream is drained.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + offset;
                let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                self.scanned = 0;
                return Ok(Some(decode(&line)));
            }
            self.scanned = self.buffer.len();

            if self.finished {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let rest = std::mem::take(&mut self.buffer);
                self.scanned = 0;
                return Ok(Some(decode(&rest)));
            }

            match self.stream.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk?),
                None => self.finished = true,
            }
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
