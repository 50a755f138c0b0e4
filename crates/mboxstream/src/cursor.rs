//! Line-at-a-time lookahead over a byte source.
//!
//! Mbox is line-oriented: both the message parser and the body reader work
//! on whole lines. The cursor keeps exactly one line of lookahead, so memory
//! use is bounded by the longest line rather than by the archive.

use std::io::{self, BufRead};

use crate::config::DEFAULT_MAX_LINE_LENGTH;
use crate::error::{Error, Result};

/// Forward-only cursor holding the most recently read line.
#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    line: Vec<u8>,
    line_number: u64,
    exhausted: bool,
    max_line_length: usize,
}

impl<R> LineCursor<R> {
    /// Creates a cursor with no line loaded yet.
    ///
    /// Call [`advance`](Self::advance) to load the first line.
    pub const fn new(reader: R, max_line_length: usize) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
            exhausted: false,
            max_line_length,
        }
    }

    /// Returns the current lookahead line. Empty once exhausted.
    #[must_use]
    pub fn current_line(&self) -> &[u8] {
        &self.line
    }

    /// Returns the 1-based number of the current line (0 before the first read).
    #[must_use]
    pub const fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Returns true once the source has reported end of input.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Consumes the cursor and returns the underlying source.
    ///
    /// The lookahead line is lost.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> LineCursor<R> {
    /// Reads the next line, newline included, into the lookahead.
    ///
    /// Returns `Ok(false)` once the source has no more bytes; the lookahead
    /// is then empty and every later call returns `Ok(false)` again. A final
    /// line without a trailing newline is still a line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the source fails, or [`Error::LineTooLong`]
    /// if the line exceeds the configured limit. The cursor position is
    /// unspecified after an error.
    pub fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        self.line.clear();
        let next = self.line_number + 1;

        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(Error::Io { line: next, source }),
            };
            if buf.is_empty() {
                break;
            }

            let (chunk, complete) = match buf.iter().position(|&b| b == b'\n') {
                Some(pos) => (&buf[..=pos], true),
                None => (buf, false),
            };
            if self.line.len() + chunk.len() > self.max_line_length {
                return Err(Error::LineTooLong {
                    line: next,
                    limit: self.max_line_length,
                });
            }
            let len = chunk.len();
            self.line.extend_from_slice(chunk);
            self.reader.consume(len);

            if complete {
                break;
            }
        }

        if self.line.is_empty() {
            self.exhausted = true;
            return Ok(false);
        }
        self.line_number = next;
        Ok(true)
    }
}

impl<R: BufRead> From<R> for LineCursor<R> {
    fn from(reader: R) -> Self {
        Self::new(reader, DEFAULT_MAX_LINE_LENGTH)
    }
}
