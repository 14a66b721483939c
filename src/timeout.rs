use log::trace;
use std::{thread, time::Duration};

use crate::{
    config::Config,
    device::{SerialComm, TimeoutMode},
    reader::Wait,
    Error, Result,
};

/// Puts the provider in the right timeout mode before each read or write
///
/// Reads poll the provider in windows of [idle_timeout](Config::idle_timeout); how many windows
/// the limited reads sit through waiting for a token is [token_wait](Self::token_wait). Writes
/// additionally wait [pre_write_delay](Config::pre_write_delay) after the mode switch so a peer
/// that has just reset has time to start listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub read_timeout: Option<Duration>,
    pub idle_timeout: Duration,
    pub write_timeout: Duration,
    pub pre_write_delay: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TimeoutPolicy {
    fn from(config: &Config) -> Self {
        Self {
            read_timeout: config.read_timeout,
            idle_timeout: config.idle_timeout,
            write_timeout: config.write_timeout,
            pre_write_delay: config.pre_write_delay,
        }
    }
}

impl TimeoutPolicy {
    pub fn apply_read<C: SerialComm>(&self, device: &mut C) -> Result<()> {
        device
            .set_timeouts(
                TimeoutMode::SemiBlockingRead,
                self.idle_timeout,
                Duration::ZERO,
            )
            .map_err(Error::read)
    }

    /// How the limited reads wait for their next token
    pub fn token_wait(&self) -> Wait {
        match self.read_timeout {
            Some(limit) => Wait::Deadline(limit),
            None => Wait::Block,
        }
    }

    pub fn apply_write<C: SerialComm>(&self, device: &mut C) -> Result<()> {
        device
            .set_timeouts(TimeoutMode::ScannerWrite, Duration::ZERO, self.write_timeout)
            .map_err(Error::write)?;
        pace(self.pre_write_delay);
        Ok(())
    }
}

/// Best-effort pause between operations
///
/// Pacing only; nothing depends on the exact duration.
pub(crate) fn pace(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    trace!("pace: sleeping {:?}", delay);
    thread::sleep(delay);
}
