//! Envelope and header line recognition.
//!
//! These routines are stateless: they inspect one line of lookahead and
//! never touch the byte source. Lines are passed with their trailing newline
//! (if the source had one).

use crate::MARKER;

/// Outcome of inspecting a line where an envelope is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeLine {
    /// `From ` followed by a sender address (trimmed).
    Sender(String),
    /// `From ` present, but only whitespace follows it.
    Blank,
    /// The line does not start with `From `.
    Absent,
}

/// Classification of a line inside a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    /// A `key: value` line. The value is trimmed on both sides.
    Field {
        /// Bytes before the colon.
        key: &'a [u8],
        /// Bytes after the colon, trimmed.
        value: &'a [u8],
    },
    /// A line starting with whitespace that extends the previous field.
    Continuation(&'a [u8]),
    /// The blank line separating headers from the body.
    Blank,
    /// Anything else.
    Invalid(&'static str),
}

/// Returns true for the bytes the mbox grammar treats as whitespace.
///
/// Every control character counts, not just space and tab.
#[must_use]
pub const fn is_whitespace(byte: u8) -> bool {
    byte <= b' '
}

/// Returns true if `line` starts with the envelope marker.
#[must_use]
pub fn is_envelope(line: &[u8]) -> bool {
    line.starts_with(MARKER)
}

/// Inspects a line for a `From ` envelope and extracts the sender.
#[must_use]
pub fn parse_envelope(line: &[u8]) -> EnvelopeLine {
    let Some(rest) = line.strip_prefix(MARKER) else {
        return EnvelopeLine::Absent;
    };
    let sender = trim(rest);
    if sender.is_empty() {
        EnvelopeLine::Blank
    } else {
        EnvelopeLine::Sender(String::from_utf8_lossy(sender).into_owned())
    }
}

/// Classifies one line of a header block.
#[must_use]
pub fn classify_header(line: &[u8]) -> HeaderLine<'_> {
    if line == b"\n" {
        return HeaderLine::Blank;
    }
    if line.len() < 2 {
        return HeaderLine::Invalid("line too short for a header");
    }
    if is_whitespace(line[0]) {
        return HeaderLine::Continuation(trim_end(line));
    }
    match line.iter().position(|&b| b == b':') {
        Some(0) => HeaderLine::Invalid("empty header name"),
        Some(colon) => HeaderLine::Field {
            key: &line[..colon],
            value: trim(&line[colon + 1..]),
        },
        None => HeaderLine::Invalid("missing ':' in header line"),
    }
}

/// Returns the value of a continuation line, or `None` if `line` is not one.
///
/// Leading whitespace is kept verbatim; trailing whitespace and the newline
/// are dropped.
#[must_use]
pub fn continuation(line: &[u8]) -> Option<String> {
    match classify_header(line) {
        HeaderLine::Continuation(value) => Some(String::from_utf8_lossy(value).into_owned()),
        _ => None,
    }
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| !is_whitespace(b))
        .unwrap_or(bytes.len());
    trim_end(&bytes[start..])
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| !is_whitespace(b))
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}
