//! Whitespace tokenization of the inbound stream and the read variants built on it
//!
//! [read_all] drains until the link goes idle. The limited variants wait for each token as
//! [Wait] says, blocking by default, and take up to `limit + 1` tokens: the loop condition is
//! `count <= limit`, and existing peer sketches are written against that count.
//!
//! Tokens are split on the single-byte whitespace set: space, `\t`, `\n`, `\x0B`, `\x0C`, `\r`
//! and the separators `\x1C`..=`\x1F`. Multi-byte Unicode spaces are not delimiters; they end up
//! inside tokens.

use log::trace;
use std::{collections::VecDeque, time::Duration, time::Instant};

use crate::{device::SerialComm, Error, Result};

/// How long to keep polling an idle link for the next token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Give up after the first idle read
    Idle,
    /// Keep polling until a token arrives
    Block,
    /// Keep polling for at most this long
    Deadline(Duration),
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'\t'..=b'\r' | 0x1C..=0x1F | b' ')
}

/// Buffered scanner over a provider's input
///
/// Bytes read past the end of the last token stay queued for the next call.
#[derive(Debug, Default)]
pub struct Tokenizer {
    buffer: VecDeque<u8>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes received but not yet consumed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Whether another token is available, polling the provider as `wait` allows
    pub fn has_next<C: SerialComm>(&mut self, device: &mut C, wait: Wait) -> Result<bool> {
        let start = Instant::now();
        loop {
            while self.buffer.front().is_some_and(|&b| is_delimiter(b)) {
                self.buffer.pop_front();
            }
            if !self.buffer.is_empty() {
                return Ok(true);
            }
            if self.read_into_queue(device)? {
                continue;
            }
            match wait {
                Wait::Idle => return Ok(false),
                Wait::Deadline(limit) if start.elapsed() >= limit => return Ok(false),
                Wait::Block | Wait::Deadline(_) => trace!("has_next: still waiting"),
            }
        }
    }

    /// Next whitespace-delimited token, or `None` if none arrived within `wait`
    ///
    /// A token that is still open when the link goes idle ends there.
    pub fn next_token<C: SerialComm>(
        &mut self,
        device: &mut C,
        wait: Wait,
    ) -> Result<Option<Vec<u8>>> {
        if !self.has_next(device, wait)? {
            return Ok(None);
        }

        let mut token = Vec::new();
        loop {
            match self.buffer.front() {
                Some(&b) if is_delimiter(b) => break,
                Some(&b) => {
                    token.push(b);
                    self.buffer.pop_front();
                }
                None => {
                    // token may continue in the next burst
                    if !self.read_into_queue(device)? {
                        break;
                    }
                }
            }
        }

        trace!("next_token: {:?}", String::from_utf8_lossy(&token));
        Ok(Some(token))
    }

    fn read_into_queue<C: SerialComm>(&mut self, device: &mut C) -> Result<bool> {
        let mut buf = [0u8; 64];
        let len = device.read(&mut buf).map_err(Error::read)?;
        if len > 0 {
            trace!(
                "read_into_queue: values {:?}",
                std::str::from_utf8(&buf[0..len])
            );
            self.buffer.extend(&buf[0..len]);
        } else {
            trace!("read_into_queue: link idle");
        }
        Ok(len > 0)
    }
}

fn next_text<C: SerialComm>(
    tokens: &mut Tokenizer,
    device: &mut C,
    wait: Wait,
) -> Result<Option<String>> {
    tokens
        .next_token(device, wait)?
        .map(|t| String::from_utf8(t).map_err(Error::from))
        .transpose()
}

/// Every token until the link goes idle, each followed by `\n`
pub fn read_all<C: SerialComm>(tokens: &mut Tokenizer, device: &mut C) -> Result<String> {
    let mut input = String::new();
    while let Some(token) = next_text(tokens, device, Wait::Idle)? {
        input.push_str(&token);
        input.push('\n');
    }
    Ok(input)
}

/// Up to `limit + 1` tokens, each followed by `\n`
pub fn read_limited<C: SerialComm>(
    tokens: &mut Tokenizer,
    device: &mut C,
    limit: usize,
    wait: Wait,
) -> Result<String> {
    let mut input = String::new();
    for _ in 0..=limit {
        let Some(token) = next_text(tokens, device, wait)? else {
            break;
        };
        input.push_str(&token);
        input.push('\n');
    }
    Ok(input)
}

/// `limit + 1` slots, one token each
///
/// Slots left over when `wait` ran out are `None`.
pub fn read_array<C: SerialComm>(
    tokens: &mut Tokenizer,
    device: &mut C,
    limit: usize,
    wait: Wait,
) -> Result<Vec<Option<String>>> {
    let mut input = vec![None; limit + 1];
    for slot in input.iter_mut() {
        let Some(token) = next_text(tokens, device, wait)? else {
            break;
        };
        *slot = Some(token);
    }
    Ok(input)
}

/// `limit + 1` slots, each token parsed as a signed decimal byte (`-128..=127`)
///
/// A token that does not parse fails the whole read with [Error::Parse].
pub fn read_bytes<C: SerialComm>(
    tokens: &mut Tokenizer,
    device: &mut C,
    limit: usize,
    wait: Wait,
) -> Result<Vec<Option<i8>>> {
    let mut input = vec![None; limit + 1];
    for slot in input.iter_mut() {
        let Some(token) = next_text(tokens, device, wait)? else {
            break;
        };
        let value = token.parse::<i8>().map_err(|e| Error::Parse(token, e))?;
        *slot = Some(value);
    }
    Ok(input)
}
