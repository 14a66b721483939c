//! The write variants
//!
//! Every variant switches the provider to write mode first, which includes the pre-write pause
//! from [TimeoutPolicy](crate::timeout::TimeoutPolicy). Provider failures are returned as
//! [Error::Write] immediately; pacing pauses are never retried or skipped.

use log::{debug, info};
use std::{fmt::Display, time::Duration};

use crate::{device::SerialComm, timeout::pace, timeout::TimeoutPolicy, Error, Result};

/// Framing of chunked writes
///
/// Sketches written for the legacy framing expect the trailing partial chunk to be dropped and a
/// single character whose code is the chunk size to follow the last chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkFraming {
    /// Send a final chunk shorter than the chunk size
    pub send_remainder: bool,
    /// After the chunks, send the character whose code is the chunk size
    pub send_size_marker: bool,
}

impl ChunkFraming {
    pub const LEGACY: Self = Self {
        send_remainder: false,
        send_size_marker: true,
    };

    /// Every character of the data and nothing else
    pub const EXACT: Self = Self {
        send_remainder: true,
        send_size_marker: false,
    };
}

impl Default for ChunkFraming {
    fn default() -> Self {
        Self::LEGACY
    }
}

fn send<C: SerialComm>(device: &mut C, data: &[u8]) -> Result<()> {
    device.write_all(data).map_err(Error::write)?;
    device.flush().map_err(Error::write)
}

/// Write the whole payload in one write and flush
pub fn write_all<C: SerialComm, P: Display + ?Sized>(
    device: &mut C,
    policy: &TimeoutPolicy,
    payload: &P,
) -> Result<()> {
    policy.apply_write(device)?;
    let payload = payload.to_string();
    debug!("write_all: {:?}", payload);
    send(device, payload.as_bytes())
}

/// Write `data` in slices of `chunk_size` characters, pausing `delay` after each slice
///
/// Slices count `char`s; a character outside the Basic Multilingual Plane is one unit here where a
/// UTF-16 based peer library would count two.
pub fn write_chunked<C: SerialComm>(
    device: &mut C,
    policy: &TimeoutPolicy,
    framing: ChunkFraming,
    data: &str,
    chunk_size: usize,
    delay: Duration,
) -> Result<()> {
    let marker = u32::try_from(chunk_size)
        .ok()
        .and_then(char::from_u32)
        .filter(|_| chunk_size > 0)
        .ok_or(Error::InvalidChunkSize(chunk_size))?;

    policy.apply_write(device)?;

    let chars: Vec<char> = data.chars().collect();
    for chunk in chars.chunks(chunk_size) {
        if chunk.len() < chunk_size && !framing.send_remainder {
            debug!(
                "write_chunked: dropping {} trailing characters",
                chunk.len()
            );
            break;
        }
        let chunk: String = chunk.iter().collect();
        send(device, chunk.as_bytes())?;
        info!("{}", chunk);
        pace(delay);
    }

    if framing.send_size_marker {
        let mut buf = [0u8; 4];
        send(device, marker.encode_utf8(&mut buf).as_bytes())?;
    }
    Ok(())
}

/// Write one character, then pause `delay` if given
pub fn write_char<C: SerialComm>(
    device: &mut C,
    policy: &TimeoutPolicy,
    data: char,
    delay: Option<Duration>,
) -> Result<()> {
    policy.apply_write(device)?;
    let mut buf = [0u8; 4];
    send(device, data.encode_utf8(&mut buf).as_bytes())?;
    if let Some(delay) = delay {
        pace(delay);
    }
    Ok(())
}
