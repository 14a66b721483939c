use log::{debug, info, warn};
use std::{fmt, fmt::Display, marker::PhantomData, time::Duration};

use crate::{
    config::Config,
    device::SerialComm,
    notifier::{ConnectionNotifier, LogNotifier},
    reader::{self, Tokenizer},
    timeout::{pace, TimeoutPolicy},
    writer, DeviceError, Error, Result,
};

/// Where a connection is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No port description yet
    Unbound,
    /// Bound to a port, never opened
    Bound,
    Open,
    Closed,
}

/// A serial connection to a microcontroller
///
/// Wraps an implementer of [SerialComm] and puts it in the right timeout mode before every read
/// and write. `P` is the payload type accepted by [write](Self::write).
///
/// The port description and baud rate can only change while the connection is not open.
///
/// ```
/// use arduino_serial::{device::MockComm, Arduino};
///
/// fn main() -> Result<(), arduino_serial::Error> {
///     let port = MockComm::new();
///     port.set_loopback(true);
///
///     let mut arduino: Arduino<MockComm> = Arduino::with_device(port);
///     arduino.set_port_description("/dev/ttyACM0")?;
///     assert!(arduino.open_connection());
///
///     arduino.write(&"hello world".to_owned())?;
///     assert_eq!(arduino.read()?, "hello\nworld\n");
///     Ok(())
/// }
/// ```
pub struct Arduino<C: SerialComm, P: Display = String> {
    device: C,
    port_description: Option<String>,
    baud_rate: Option<u32>,
    state: ConnectionState,
    config: Config,
    policy: TimeoutPolicy,
    tokens: Tokenizer,
    notifier: Box<dyn ConnectionNotifier>,
    payload: PhantomData<fn(&P)>,
}

impl<C: SerialComm + Default, P: Display> Default for Arduino<C, P> {
    fn default() -> Self {
        Self::with_device(C::default())
    }
}

impl<C: SerialComm + Default, P: Display> Arduino<C, P> {
    /// Connection bound to `port_description`, not yet open
    pub fn new(port_description: &str) -> Result<Self> {
        let mut arduino = Self::default();
        arduino.set_port_description(port_description)?;
        Ok(arduino)
    }

    /// Connection bound to `port_description` at `baud_rate`, not yet open
    ///
    /// The baud rate has to match the one the sketch passes to `Serial.begin`.
    pub fn with_baud_rate(port_description: &str, baud_rate: u32) -> Result<Self> {
        let mut arduino = Self::new(port_description)?;
        arduino.set_baud_rate(baud_rate)?;
        Ok(arduino)
    }
}

impl<C: SerialComm, P: Display> Arduino<C, P> {
    /// Unbound connection over an existing provider
    pub fn with_device(device: C) -> Self {
        let config = Config::default();
        Self {
            device,
            port_description: None,
            baud_rate: None,
            state: ConnectionState::Unbound,
            policy: TimeoutPolicy::from(&config),
            config,
            tokens: Tokenizer::new(),
            notifier: Box::new(LogNotifier),
            payload: PhantomData,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.policy = TimeoutPolicy::from(&config);
        self.config = config;
        self
    }

    /// Replace the default [LogNotifier]
    pub fn with_notifier(mut self, notifier: impl ConnectionNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// The underlying provider
    pub fn device(&self) -> &C {
        &self.device
    }

    /// The underlying provider, for settings this type does not cover
    ///
    /// Rebinding or closing through this bypasses [state](Self::state).
    pub fn device_mut(&mut self) -> &mut C {
        &mut self.device
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn port_description(&self) -> Option<&str> {
        self.port_description.as_deref()
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    /// Bind to another port
    ///
    /// Fails with [Error::PortBusy] while the connection is open.
    pub fn set_port_description(&mut self, port_description: &str) -> Result<()> {
        if self.is_open() {
            return Err(Error::PortBusy("port description"));
        }
        if port_description.is_empty() {
            return Err(Error::EmptyPortDescription);
        }
        self.device.bind(port_description);
        if let Some(baud_rate) = self.baud_rate {
            self.device
                .set_baud_rate(baud_rate)
                .map_err(|e| Error::Connection(DeviceError(e)))?;
        }
        self.port_description = Some(port_description.to_owned());
        self.tokens.clear();
        self.state = ConnectionState::Bound;
        Ok(())
    }

    /// Fails with [Error::PortBusy] while the connection is open.
    pub fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        if self.is_open() {
            return Err(Error::PortBusy("baud rate"));
        }
        self.device
            .set_baud_rate(baud_rate)
            .map_err(|e| Error::Connection(DeviceError(e)))?;
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    /// Open the bound port and wait for the board to settle
    ///
    /// On failure the notifier is told once, the connection stays closed and `false` is
    /// returned; a different port description can then be tried.
    pub fn open_connection(&mut self) -> bool {
        match self.connect() {
            Ok(()) => true,
            Err(e) => {
                warn!("open_connection: {}", e);
                self.notifier.notify("Error Connecting", "Try Another port");
                false
            }
        }
    }

    /// Like [open_connection](Self::open_connection), but returns the error and does not notify
    pub fn connect(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Open => {
                debug!("connect: already open");
                return Ok(());
            }
            ConnectionState::Unbound => {
                return Err(Error::Connection(DeviceError(
                    crate::device::Error::Unbound,
                )))
            }
            ConnectionState::Bound | ConnectionState::Closed => {}
        }

        self.device
            .open()
            .map_err(|e| Error::Connection(DeviceError(e)))?;
        pace(self.config.settle_delay);
        self.tokens.clear();
        self.state = ConnectionState::Open;
        info!("Connected to {:?}", self.port_description);
        Ok(())
    }

    pub fn close_connection(&mut self) {
        if !self.is_open() {
            debug!("close_connection: not open");
            return;
        }
        self.device.close();
        self.state = ConnectionState::Closed;
        info!("Closed {:?}", self.port_description);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    fn prepare_read(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.policy.apply_read(&mut self.device)
    }

    /// Read every token until the link goes idle, one per line
    pub fn read(&mut self) -> Result<String> {
        self.prepare_read()?;
        reader::read_all(&mut self.tokens, &mut self.device)
    }

    /// Read up to `limit + 1` tokens, one per line
    ///
    /// Waits for each token as long as [read_timeout](Config::read_timeout) allows, which is
    /// indefinitely by default.
    pub fn read_limited(&mut self, limit: usize) -> Result<String> {
        self.prepare_read()?;
        let wait = self.policy.token_wait();
        reader::read_limited(&mut self.tokens, &mut self.device, limit, wait)
    }

    /// Read up to `limit + 1` tokens into their own slots
    pub fn read_array(&mut self, limit: usize) -> Result<Vec<Option<String>>> {
        self.prepare_read()?;
        let wait = self.policy.token_wait();
        reader::read_array(&mut self.tokens, &mut self.device, limit, wait)
    }

    /// Read up to `limit + 1` tokens, each a signed decimal byte
    pub fn read_bytes(&mut self, limit: usize) -> Result<Vec<Option<i8>>> {
        self.prepare_read()?;
        let wait = self.policy.token_wait();
        reader::read_bytes(&mut self.tokens, &mut self.device, limit, wait)
    }

    /// Send the whole payload at once
    pub fn write(&mut self, payload: &P) -> Result<()> {
        self.ensure_open()?;
        writer::write_all(&mut self.device, &self.policy, payload)
    }

    /// Send `data` gradually, `chunk_size` characters at a time with `delay` after each chunk
    ///
    /// See [ChunkFraming](crate::writer::ChunkFraming) for what happens around the last chunk.
    pub fn write_chunked(&mut self, data: &str, chunk_size: usize, delay: Duration) -> Result<()> {
        self.ensure_open()?;
        writer::write_chunked(
            &mut self.device,
            &self.policy,
            self.config.chunk_framing,
            data,
            chunk_size,
            delay,
        )
    }

    pub fn write_char(&mut self, data: char) -> Result<()> {
        self.ensure_open()?;
        writer::write_char(&mut self.device, &self.policy, data, None)
    }

    /// Send one character, then pause for `delay`
    pub fn write_char_with_delay(&mut self, data: char, delay: Duration) -> Result<()> {
        self.ensure_open()?;
        writer::write_char(&mut self.device, &self.policy, data, Some(delay))
    }
}

impl<C: SerialComm, P: Display> fmt::Debug for Arduino<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arduino")
            .field("port_description", &self.port_description)
            .field("baud_rate", &self.baud_rate)
            .field("state", &self.state)
            .finish()
    }
}
