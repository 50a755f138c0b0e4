//! Parsed messages and their lazily streamed bodies.

use std::fmt;
use std::io::{self, BufRead, Read};

use crate::cursor::LineCursor;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::parser;

/// Owned sender and headers of a message.
///
/// Obtained from [`Message::envelope`] or [`Message::into_envelope`]; unlike
/// [`Message`] it does not borrow the stream and can be kept around.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// Sender from the `From ` line, whitespace-trimmed.
    pub sender: String,
    /// Header block.
    pub headers: Headers,
}

/// A message read from a [`MessageStream`](crate::MessageStream).
///
/// The message mutably borrows the stream, so the next message cannot be
/// requested while this one (or its body reader) is still in use.
pub struct Message<'a, R> {
    envelope: Envelope,
    cursor: Option<&'a mut LineCursor<R>>,
}

impl<'a, R: BufRead> Message<'a, R> {
    pub(crate) fn new(envelope: Envelope, cursor: &'a mut LineCursor<R>) -> Self {
        Self {
            envelope,
            cursor: Some(cursor),
        }
    }

    /// Returns the sending address.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.envelope.sender
    }

    /// Returns the message headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.envelope.headers
    }

    /// Returns the sender and headers.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Drops the body capability and keeps the sender and headers.
    ///
    /// Unless the body was empty, call
    /// [`MessageStream::skip_body`](crate::MessageStream::skip_body) before
    /// reading the next message.
    #[must_use]
    pub fn into_envelope(self) -> Envelope {
        self.envelope
    }

    /// Returns the reader for this message's body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyAlreadyTaken`] if called more than once.
    pub fn body_reader(&mut self) -> Result<BodyReader<'a, R>> {
        self.cursor
            .take()
            .map(BodyReader::new)
            .ok_or(Error::BodyAlreadyTaken)
    }
}

impl<R> fmt::Debug for Message<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("sender", &self.envelope.sender)
            .field("headers", &self.envelope.headers)
            .field("body_taken", &self.cursor.is_none())
            .finish()
    }
}

/// Why a body reader stopped.
#[derive(Debug)]
enum Terminal {
    /// Next envelope or end of input reached.
    EndOfBody,
    /// The source failed; replayed on every later read.
    Failed {
        kind: io::ErrorKind,
        message: String,
    },
}

/// Streams one message body, line by line, straight from the source.
///
/// Implements [`Read`] and [`BufRead`]. End of body (the next `From ` line
/// or the end of input, which are not distinguished) is reported as
/// `Ok(0)` / an empty buffer, and keeps being reported on every later call.
/// The envelope line of the next message is never consumed.
pub struct BodyReader<'a, R> {
    cursor: &'a mut LineCursor<R>,
    offset: usize,
    terminal: Option<Terminal>,
}

impl<'a, R: BufRead> BodyReader<'a, R> {
    fn new(cursor: &'a mut LineCursor<R>) -> Self {
        Self {
            cursor,
            offset: 0,
            terminal: None,
        }
    }

    /// Returns true once end of body has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.terminal, Some(Terminal::EndOfBody))
    }

    /// Returns the number of the line currently being read.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.cursor.line_number()
    }

    /// Discards the rest of the body, returning the number of bytes skipped.
    ///
    /// # Errors
    ///
    /// Returns the source's error if reading fails.
    pub fn skip(&mut self) -> io::Result<u64> {
        let mut skipped = 0u64;
        loop {
            let len = self.fill_buf()?.len();
            if len == 0 {
                return Ok(skipped);
            }
            self.consume(len);
            skipped += len as u64;
        }
    }

    fn fail(&mut self, err: Error) -> io::Error {
        let err = io::Error::from(err);
        self.terminal = Some(Terminal::Failed {
            kind: err.kind(),
            message: err.to_string(),
        });
        err
    }
}

impl<R: BufRead> BufRead for BodyReader<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        loop {
            match &self.terminal {
                Some(Terminal::EndOfBody) => return Ok(&[]),
                Some(Terminal::Failed { kind, message }) => {
                    return Err(io::Error::new(*kind, message.clone()));
                }
                None => {}
            }

            if self.cursor.is_exhausted()
                || (self.offset == 0 && parser::is_envelope(self.cursor.current_line()))
            {
                tracing::trace!(line = self.cursor.line_number(), "end of body");
                self.terminal = Some(Terminal::EndOfBody);
                continue;
            }

            if self.offset < self.cursor.current_line().len() {
                return Ok(&self.cursor.current_line()[self.offset..]);
            }

            self.offset = 0;
            if let Err(err) = self.cursor.advance() {
                return Err(self.fail(err));
            }
            tracing::trace!(line = self.cursor.line_number(), "body line");
        }
    }

    fn consume(&mut self, amt: usize) {
        if self.terminal.is_none() {
            self.offset = (self.offset + amt).min(self.cursor.current_line().len());
        }
    }
}

impl<R: BufRead> Read for BodyReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R> fmt::Debug for BodyReader<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyReader")
            .field("line", &self.cursor.line_number())
            .field("offset", &self.offset)
            .field("terminal", &self.terminal)
            .finish()
    }
}
