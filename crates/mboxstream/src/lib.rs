//! # mboxstream
//!
//! Streaming parser for mbox mailbox archives.
//!
//! ## Features
//!
//! - **Sequential parsing**: One message at a time from any [`std::io::BufRead`]
//! - **Lazy bodies**: Body bytes are streamed line by line, never buffered whole
//! - **Borrow-checked sequencing**: A message borrows the stream, so two
//!   consumers can never advance the source at once
//! - **Ordered headers**: Multi-valued headers in order of first appearance,
//!   continuation lines kept verbatim
//!
//! ## Quick Start
//!
//! ```
//! use std::io::Read;
//! use mboxstream::MessageStream;
//!
//! let archive = "From foo@bar.com\n\
//!                Subject: Hello world\n\
//!                \n\
//!                Test message\n";
//!
//! let mut stream = MessageStream::open(archive.as_bytes())?;
//! while let Some(mut message) = stream.read_message()? {
//!     println!("From: {}", message.sender());
//!     println!("Subject: {}", message.headers().first("Subject").unwrap_or("(no subject)"));
//!
//!     let mut body = String::new();
//!     message.body_reader()?.read_to_string(&mut body)?;
//!     println!("{body}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Archive Format
//!
//! ```text
//! From <sender>            envelope line, starts every message
//! Key: value               one or more header lines
//!  continuation            lines starting with whitespace extend the header
//!                          blank line
//! body...                  up to the next "From " line or end of input
//! ```
//!
//! `From ` lines inside a body are not unescaped: any line starting with
//! `From ` ends the current body.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod cursor;
mod error;
mod header;
mod message;
mod stream;

pub mod parser;

pub use config::{Config, ConfigBuilder, DEFAULT_MAX_HEADERS, DEFAULT_MAX_LINE_LENGTH};
pub use cursor::LineCursor;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{BodyReader, Envelope, Message};
pub use stream::MessageStream;

/// Prefix that introduces every message: `From` followed by one space.
pub const MARKER: &[u8] = b"From ";
