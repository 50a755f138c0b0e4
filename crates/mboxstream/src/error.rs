//! Error types for mbox parsing.

use std::io;

/// Result type alias for mbox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Mbox error types.
///
/// Every variant produced while reading the archive carries the 1-based line
/// number the cursor was on when the problem was detected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The archive does not start with a `From ` envelope line.
    #[error("{line}: mbox file not properly framed; 'From ' expected")]
    Format {
        /// Line on which the envelope was expected.
        line: u64,
    },

    /// Envelope marker present, but no sender address follows it.
    #[error("{line}: sender address expected after 'From '")]
    MalformedEnvelope {
        /// Line holding the envelope.
        line: u64,
    },

    /// Header block could not be parsed.
    #[error("{line}: malformed header: {reason}")]
    MalformedHeader {
        /// Offending line.
        line: u64,
        /// Description of what went wrong.
        reason: &'static str,
    },

    /// The previous message's body was neither read to the end nor skipped.
    #[error("{line}: previous message body was not drained")]
    BodyNotDrained {
        /// Line the cursor is parked on.
        line: u64,
    },

    /// `body_reader()` was called a second time on the same message.
    #[error("body reader already taken for this message")]
    BodyAlreadyTaken,

    /// A line exceeded the configured maximum length.
    #[error("{line}: line exceeds {limit} bytes")]
    LineTooLong {
        /// Line being read.
        line: u64,
        /// Configured limit.
        limit: usize,
    },

    /// I/O error from the underlying byte source.
    #[error("{line}: I/O error: {source}")]
    Io {
        /// Line being read when the source failed.
        line: u64,
        /// Error reported by the source.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns the line number attached to this error, if any.
    #[must_use]
    pub const fn line(&self) -> Option<u64> {
        match self {
            Self::Format { line }
            | Self::MalformedEnvelope { line }
            | Self::MalformedHeader { line, .. }
            | Self::BodyNotDrained { line }
            | Self::LineTooLong { line, .. }
            | Self::Io { line, .. } => Some(*line),
            Self::BodyAlreadyTaken => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io { source, .. } => source,
            other => Self::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line() {
        let err = Error::MalformedHeader {
            line: 3,
            reason: "missing ':'",
        };
        assert_eq!(err.to_string(), "3: malformed header: missing ':'");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_body_already_taken_has_no_line() {
        assert_eq!(Error::BodyAlreadyTaken.line(), None);
    }

    #[test]
    fn test_into_io_error_keeps_source() {
        let err = Error::Io {
            line: 7,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(io_err.to_string(), "pipe closed");
    }

    #[test]
    fn test_into_io_error_parse_is_invalid_data() {
        let io_err: io::Error = Error::LineTooLong { line: 2, limit: 8 }.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
        assert!(io_err.to_string().contains("exceeds 8 bytes"));
    }
}
