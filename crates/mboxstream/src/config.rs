//! Parser configuration types.

/// Default maximum line length (1 MiB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Default maximum number of header lines per message.
pub const DEFAULT_MAX_HEADERS: usize = 10_000;

/// Mbox parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Longest line accepted from the source, newline included.
    pub max_line_length: usize,
    /// Most header lines (key lines plus continuations) accepted per message.
    pub max_headers: usize,
}

impl Config {
    /// Creates a configuration with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_headers: DEFAULT_MAX_HEADERS,
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for parser configuration.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    max_line_length: usize,
    max_headers: usize,
}

impl ConfigBuilder {
    /// Creates a new builder with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_headers: DEFAULT_MAX_HEADERS,
        }
    }

    /// Sets the maximum line length.
    #[must_use]
    pub const fn max_line_length(mut self, limit: usize) -> Self {
        self.max_line_length = limit;
        self
    }

    /// Sets the maximum number of header lines per message.
    #[must_use]
    pub const fn max_headers(mut self, limit: usize) -> Self {
        self.max_headers = limit;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub const fn build(self) -> Config {
        Config {
            max_line_length: self.max_line_length,
            max_headers: self.max_headers,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
