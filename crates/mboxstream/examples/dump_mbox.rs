#![allow(clippy::uninlined_format_args)]
//! Example: list the messages in an mbox file
//!
//! Prints the sender, subject and body size of every message, streaming
//! bodies without loading the archive into memory.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=mboxstream=debug cargo run --package mboxstream --example dump_mbox -- INBOX.mbox
//! ```
//!
//! Reads standard input when no path is given.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use mboxstream::MessageStream;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mboxstream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let source: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "reading mbox file");
            Box::new(BufReader::new(File::open(path)?))
        }
        None => Box::new(io::stdin().lock()),
    };

    let mut stream = MessageStream::open(source)?;
    let mut index = 0;
    while let Some(mut message) = stream.read_message()? {
        index += 1;
        let subject = message
            .headers()
            .first("Subject")
            .unwrap_or("(no subject)")
            .to_string();
        let sender = message.sender().to_string();
        let size = message.body_reader()?.skip()?;
        println!("{:>6}  {:<40}  {} ({} bytes)", index, sender, subject, size);
    }

    info!(messages = stream.messages_read(), "done");
    Ok(())
}
