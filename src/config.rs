//! Tunables for delays, provider timeouts and chunk framing

use crate::writer::ChunkFraming;
use std::time::Duration;

/// Transport configuration
///
/// The defaults match what Arduino-style sketches expect: a 100 ms pause after opening (most
/// boards reset when the port opens) and a 5 ms pause before each write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Pause after a successful open before the connection is reported ready
    pub settle_delay: Duration,
    /// Pause after switching to write mode, before any bytes go out
    pub pre_write_delay: Duration,
    /// Longest wait for the next token in the limited reads; `None` blocks until one arrives
    pub read_timeout: Option<Duration>,
    /// Quiet time after which the link counts as idle
    ///
    /// Ends [read](crate::Arduino::read) and a token cut off mid-burst, and is the provider's
    /// per-call read timeout.
    pub idle_timeout: Duration,
    pub write_timeout: Duration,
    pub chunk_framing: ChunkFraming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            pre_write_delay: Duration::from_millis(5),
            read_timeout: None,
            idle_timeout: Duration::from_millis(1000),
            write_timeout: Duration::from_millis(1000),
            chunk_framing: ChunkFraming::LEGACY,
        }
    }
}

impl Config {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_pre_write_delay(mut self, delay: Duration) -> Self {
        self.pre_write_delay = delay;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_chunk_framing(mut self, framing: ChunkFraming) -> Self {
        self.chunk_framing = framing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert_eq!(config.pre_write_delay, Duration::from_millis(5));
        assert_eq!(config.chunk_framing, ChunkFraming::LEGACY);
        assert_eq!(config.read_timeout, None);
        assert_eq!(config.idle_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_settle_delay(Duration::ZERO)
            .with_read_timeout(Some(Duration::from_millis(20)))
            .with_chunk_framing(ChunkFraming::EXACT);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.read_timeout, Some(Duration::from_millis(20)));
        assert_eq!(config.pre_write_delay, Duration::from_millis(5));
        assert!(config.chunk_framing.send_remainder);
    }
}
