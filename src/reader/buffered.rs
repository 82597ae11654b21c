//! Buffered Input
//!
//! Reads from any source implementing Read into a sliding window.
//! The window only grows when a single construct outlives it, so memory
//! is bounded by the largest token rather than the document.

use std::io::{self, Read};

/// Sliding-window reader for streaming input
pub struct BufferedReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    pos: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> BufferedReader<R> {
    /// Create a new buffered reader with specified buffer capacity
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        BufferedReader {
            reader,
            buffer: vec![0u8; capacity.max(4)],
            pos: 0,
            end: 0,
            eof: false,
        }
    }

    /// Read more data from the source. Returns `false` once the source is
    /// exhausted.
    pub fn fill_buffer(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }

        // Compact: move remaining data to start
        if self.pos > 0 {
            let remaining = self.end - self.pos;
            if remaining > 0 {
                self.buffer.copy_within(self.pos..self.end, 0);
            }
            self.end = remaining;
            self.pos = 0;
        }

        // Window full of unconsumed data: grow it
        if self.end == self.buffer.len() {
            let grown = self.buffer.len() * 2;
            self.buffer.resize(grown, 0);
        }

        loop {
            match self.reader.read(&mut self.buffer[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(read) => {
                    self.end += read;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Make at least `n` bytes available unless the source ends first.
    /// Returns the number of bytes actually buffered.
    pub fn ensure(&mut self, n: usize) -> io::Result<usize> {
        while self.end - self.pos < n {
            if !self.fill_buffer()? {
                break;
            }
        }
        Ok(self.end - self.pos)
    }

    /// Get current buffered data as a slice
    #[inline]
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..self.end]
    }

    /// Consume n bytes from the buffer
    #[inline]
    pub fn consume(&mut self, n: usize) {
        self.pos += n.min(self.end - self.pos);
    }
}
