//! Sequential mbox message parser.

use std::io::{BufRead, BufReader, Read};

use tracing::{debug, warn};

use crate::config::Config;
use crate::cursor::LineCursor;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::message::{Envelope, Message};
use crate::parser::{self, EnvelopeLine, HeaderLine};

/// A stream of messages read from an mbox archive.
///
/// Messages are parsed one at a time from a single forward-only cursor.
/// Each [`Message`] borrows the stream; its body must be read to the end
/// (or skipped with [`skip_body`](Self::skip_body)) before the next message
/// can be parsed.
#[derive(Debug)]
pub struct MessageStream<R> {
    cursor: LineCursor<R>,
    config: Config,
    body_pending: bool,
    messages_read: u64,
}

impl<R: BufRead> MessageStream<R> {
    /// Opens a stream with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the source does not start with a
    /// `From <sender>` line.
    pub fn open(source: R) -> Result<Self> {
        Self::with_config(source, Config::default())
    }

    /// Opens a stream with the given configuration.
    ///
    /// Only the first line is checked: success does not mean the rest of
    /// the archive is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the source does not start with a
    /// `From <sender>` line, or any error from reading that line.
    pub fn with_config(source: R, config: Config) -> Result<Self> {
        let mut cursor = LineCursor::new(source, config.max_line_length);
        cursor.advance()?;

        if !matches!(
            parser::parse_envelope(cursor.current_line()),
            EnvelopeLine::Sender(_)
        ) {
            return Err(Error::Format {
                line: cursor.line_number().max(1),
            });
        }
        debug!(?config, "opened mbox stream");

        Ok(Self {
            cursor,
            config,
            body_pending: false,
            messages_read: 0,
        })
    }

    /// Parses the next message's envelope and headers.
    ///
    /// Returns `Ok(None)` at the end of the archive. On success the cursor
    /// sits on the first body line, ready for the message's body reader.
    ///
    /// # Errors
    ///
    /// - [`Error::BodyNotDrained`] if the previous body was not read to the
    ///   end; the stream is unchanged and [`skip_body`](Self::skip_body)
    ///   recovers it.
    /// - [`Error::MalformedEnvelope`] if the `From ` line has no sender.
    /// - [`Error::MalformedHeader`] if the header block is invalid.
    /// - [`Error::Io`] / [`Error::LineTooLong`] from the source.
    pub fn read_message(&mut self) -> Result<Option<Message<'_, R>>> {
        if self.body_pending {
            if !self.body_drained() {
                let line = self.cursor.line_number();
                warn!(line, "previous message body not drained");
                return Err(Error::BodyNotDrained { line });
            }
            self.body_pending = false;
        }

        if self.cursor.is_exhausted() {
            debug!(messages = self.messages_read, "end of archive");
            return Ok(None);
        }

        let envelope_line = self.cursor.line_number();
        let sender = match parser::parse_envelope(self.cursor.current_line()) {
            EnvelopeLine::Sender(sender) => sender,
            EnvelopeLine::Blank => {
                return Err(Error::MalformedEnvelope {
                    line: envelope_line,
                });
            }
            EnvelopeLine::Absent => {
                debug!(line = envelope_line, "no envelope line, treating as end of archive");
                return Ok(None);
            }
        };
        self.cursor.advance()?;

        let headers = self.read_headers()?;
        // Step off the blank separator onto the first body line.
        self.cursor.advance()?;

        self.body_pending = true;
        self.messages_read += 1;
        debug!(
            line = envelope_line,
            sender = %sender,
            headers = headers.len(),
            "parsed message"
        );

        Ok(Some(Message::new(
            Envelope { sender, headers },
            &mut self.cursor,
        )))
    }

    /// Discards whatever is left of the current message's body.
    ///
    /// Returns the number of lines skipped; zero if there is no pending body
    /// or it was already drained.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the source fails.
    pub fn skip_body(&mut self) -> Result<u64> {
        let mut skipped = 0;
        if self.body_pending {
            while !self.body_drained() {
                self.cursor.advance()?;
                skipped += 1;
            }
            debug!(lines = skipped, "skipped message body");
        }
        Ok(skipped)
    }

    /// Returns the number of the line the cursor is on.
    #[must_use]
    pub const fn line_number(&self) -> u64 {
        self.cursor.line_number()
    }

    /// Returns how many messages have been parsed so far.
    #[must_use]
    pub const fn messages_read(&self) -> u64 {
        self.messages_read
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Consumes the stream and returns the underlying source.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }

    fn body_drained(&self) -> bool {
        self.cursor.is_exhausted() || parser::is_envelope(self.cursor.current_line())
    }

    fn read_headers(&mut self) -> Result<Headers> {
        let mut headers = Headers::new();
        let mut lines = 0usize;

        loop {
            let line = self.cursor.line_number();
            if self.cursor.is_exhausted() {
                return Err(Error::MalformedHeader {
                    line,
                    reason: "headers not terminated by a blank line",
                });
            }

            let index = match parser::classify_header(self.cursor.current_line()) {
                HeaderLine::Blank => break,
                HeaderLine::Continuation(_) => {
                    return Err(Error::MalformedHeader {
                        line,
                        reason: "continuation line without a preceding header",
                    });
                }
                HeaderLine::Invalid(reason) => {
                    return Err(Error::MalformedHeader { line, reason });
                }
                HeaderLine::Field { key, value } => headers.add(
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(value),
                ),
            };
            lines = self.count_header_line(lines)?;
            self.cursor.advance()?;

            while let Some(value) = parser::continuation(self.cursor.current_line()) {
                lines = self.count_header_line(lines)?;
                headers.extend_at(index, value);
                self.cursor.advance()?;
            }
        }

        if headers.is_empty() {
            return Err(Error::MalformedHeader {
                line: self.cursor.line_number(),
                reason: "message has no headers",
            });
        }
        Ok(headers)
    }

    fn count_header_line(&self, lines: usize) -> Result<usize> {
        if lines >= self.config.max_headers {
            return Err(Error::MalformedHeader {
                line: self.cursor.line_number(),
                reason: "too many header lines",
            });
        }
        Ok(lines + 1)
    }
}

impl<R: Read> MessageStream<BufReader<R>> {
    /// Opens a stream over an unbuffered source, wrapping it in a
    /// [`BufReader`].
    ///
    /// # Errors
    ///
    /// Same as [`open`](MessageStream::open).
    pub fn from_reader(source: R) -> Result<Self> {
        Self::open(BufReader::new(source))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::similar_names)]
mod tests {
    use super::*;

    const ONE_MESSAGE: &str = "From foo@bar.com\nSubject: Hello world\n\nTest message\n";

    const THREE_HEADERS: &str = "From foo@bar.com
From: foo@bar.com
To: user1@bar.com
 user2@bar.com
 user3@bar.com
 user4@bar.com
 user5@bar.com
Subject: Hello world

Greetings and hallucinations!
";

    fn open(source: &str) -> MessageStream<&[u8]> {
        MessageStream::open(source.as_bytes()).unwrap()
    }

    fn first_error(source: &str) -> Error {
        open(source).read_message().unwrap_err()
    }

    #[test]
    fn test_open_rejects_bad_framing() {
        for source in ["", "\nFrom foo\n", "From ", " From ", "From   \t\t  \t\t", "Fro"] {
            let err = MessageStream::open(source.as_bytes()).unwrap_err();
            assert!(
                matches!(err, Error::Format { line: 1 }),
                "{source:?}: {err:?}"
            );
        }
    }

    #[test]
    fn test_open_accepts_envelope() {
        let stream = open(ONE_MESSAGE);
        assert_eq!(stream.line_number(), 1);
        assert_eq!(stream.messages_read(), 0);
    }

    #[test]
    fn test_single_message() {
        let mut stream = open(ONE_MESSAGE);
        let mut message = stream.read_message().unwrap().unwrap();
        assert_eq!(message.sender(), "foo@bar.com");
        assert_eq!(&message.headers()["Subject"], ["Hello world"]);
        assert_eq!(message.headers().len(), 1);

        let mut body = String::new();
        message
            .body_reader()
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "Test message\n");

        assert!(stream.read_message().unwrap().is_none());
        assert_eq!(stream.messages_read(), 1);
    }

    #[test]
    fn test_continuation_values() {
        let mut stream = open("From foo@bar.com\nSubject: Hello\n world\n\nTest message\n");
        let message = stream.read_message().unwrap().unwrap();
        assert_eq!(message.headers().len(), 1);
        assert_eq!(&message.headers()["Subject"], ["Hello", " world"]);
    }

    #[test]
    fn test_multiple_headers() {
        let mut stream = open(THREE_HEADERS);
        let message = stream.read_message().unwrap().unwrap();
        let headers = message.headers();
        assert_eq!(
            headers.keys().collect::<Vec<_>>(),
            ["From", "To", "Subject"]
        );
        assert_eq!(&headers["From"], ["foo@bar.com"]);
        assert_eq!(
            &headers["To"],
            [
                "user1@bar.com",
                " user2@bar.com",
                " user3@bar.com",
                " user4@bar.com",
                " user5@bar.com"
            ]
        );
        assert_eq!(&headers["Subject"], ["Hello world"]);
    }

    #[test]
    fn test_no_headers_rejected() {
        let err = first_error("From foo@bar.com\n\nTest message\n");
        assert!(matches!(
            err,
            Error::MalformedHeader {
                line: 2,
                reason: "message has no headers"
            }
        ));
    }

    #[test]
    fn test_leading_continuation_rejected() {
        let err = first_error("From foo@bar.com\n continuation-line\n\nTest message\n");
        assert!(matches!(err, Error::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = first_error("From foo@bar.com\n: value-line\n\nTest message\n");
        assert!(matches!(err, Error::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_missing_colon_rejected() {
        let err = first_error("From foo@bar.com\nSubject Hello\n\nbody\n");
        assert!(matches!(err, Error::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_unterminated_headers_rejected() {
        let err = first_error("From foo@bar.com\nSubject: Hello\n");
        assert!(matches!(
            err,
            Error::MalformedHeader {
                reason: "headers not terminated by a blank line",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_second_envelope() {
        let mut stream = open("From a@x\nS: 1\n\nbody\nFrom    \nS: 2\n\n");
        let mut message = stream.read_message().unwrap().unwrap();
        message.body_reader().unwrap().skip().unwrap();
        let err = stream.read_message().unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope { line: 5 }));
    }

    #[test]
    fn test_body_not_drained() {
        let mut stream = open("From a@x\nS: 1\n\nbody 1\nFrom b@x\nS: 2\n\nbody 2\n");
        stream.read_message().unwrap().unwrap();
        let err = stream.read_message().unwrap_err();
        assert!(matches!(err, Error::BodyNotDrained { line: 4 }));
        // Refusal is repeatable and does not disturb the stream.
        assert!(matches!(
            stream.read_message().unwrap_err(),
            Error::BodyNotDrained { .. }
        ));

        assert_eq!(stream.skip_body().unwrap(), 1);
        let message = stream.read_message().unwrap().unwrap();
        assert_eq!(message.sender(), "b@x");
    }

    #[test]
    fn test_partially_read_body_not_drained() {
        let mut stream = open("From a@x\nS: 1\n\nline one\nline two\nFrom b@x\nS: 2\n\n");
        {
            let mut message = stream.read_message().unwrap().unwrap();
            let mut reader = message.body_reader().unwrap();
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf).unwrap();
        }
        assert!(matches!(
            stream.read_message().unwrap_err(),
            Error::BodyNotDrained { .. }
        ));
    }

    #[test]
    fn test_empty_body_needs_no_drain() {
        let mut stream = open("From a@x\nS: 1\n\nFrom b@x\nS: 2\n\n");
        assert_eq!(stream.read_message().unwrap().unwrap().sender(), "a@x");
        assert_eq!(stream.read_message().unwrap().unwrap().sender(), "b@x");
        assert!(stream.read_message().unwrap().is_none());
    }

    #[test]
    fn test_skip_body_without_pending_message() {
        let mut stream = open(ONE_MESSAGE);
        assert_eq!(stream.skip_body().unwrap(), 0);
    }

    #[test]
    fn test_repeated_key_merges_values() {
        let mut stream = open("From a@x\nReceived: one\nX: y\nReceived: two\n\n");
        let message = stream.read_message().unwrap().unwrap();
        assert_eq!(&message.headers()["Received"], ["one", "two"]);
        assert_eq!(message.headers().len(), 2);
    }

    #[test]
    fn test_too_many_headers() {
        let config = Config::builder().max_headers(2).build();
        let source = "From a@x\nA: 1\n 2\n 3\n\n";
        let mut stream = MessageStream::with_config(source.as_bytes(), config).unwrap();
        let err = stream.read_message().unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedHeader {
                line: 4,
                reason: "too many header lines"
            }
        ));
    }

    #[test]
    fn test_line_too_long_in_body() {
        let config = Config::builder().max_line_length(32).build();
        let source = "From a@x\nS: 1\n\nshort\nthis body line is far longer than the limit\n";
        let mut stream = MessageStream::with_config(source.as_bytes(), config).unwrap();
        let mut message = stream.read_message().unwrap().unwrap();
        let mut body = Vec::new();
        let err = message
            .body_reader()
            .unwrap()
            .read_to_end(&mut body)
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert_eq!(body, b"short\n");
    }

    #[test]
    fn test_from_reader() {
        let mut stream = MessageStream::from_reader(ONE_MESSAGE.as_bytes()).unwrap();
        assert!(stream.read_message().unwrap().is_some());
    }

    #[test]
    fn test_into_inner() {
        let stream = open(ONE_MESSAGE);
        let rest = stream.into_inner();
        assert_eq!(rest, b"Subject: Hello world\n\nTest message\n");
    }
}
