use super::serial_comm::{SerialComm, TimeoutMode, DEFAULT_BAUD_RATE};
use super::{Error, Result};
use log::{debug, trace};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Communicate with a serial device using the
/// serialport library
///
/// /dev/tty* or similar on unix-like systems
/// COM devices on Windows systems
///
/// The port is only resolved when [open](SerialComm::open) is called, so the path and baud rate
/// can be changed freely until then.
pub struct SerialPortComm {
    path: Option<String>,
    baud_rate: u32,
    timeout: Duration,
    device: Option<Box<dyn serialport::SerialPort>>,
}

impl Default for SerialPortComm {
    fn default() -> Self {
        Self {
            path: None,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(1000),
            device: None,
        }
    }
}

impl SerialPortComm {
    /// Creates a new instance bound to `path`, not yet opened
    pub fn new(path: &str) -> Self {
        let mut comm = Self::default();
        comm.bind(path);
        comm
    }

    fn device(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>> {
        self.device.as_mut().ok_or(Error::NotOpen)
    }
}

impl SerialComm for SerialPortComm {
    fn bind(&mut self, path: &str) {
        if self.device.take().is_some() {
            debug!("bind: dropping open handle on {:?}", self.path);
        }
        self.path = Some(path.to_owned());
    }

    fn open(&mut self) -> Result<()> {
        let path = self.path.as_deref().ok_or(Error::Unbound)?;
        let device = serialport::new(path, self.baud_rate)
            .timeout(self.timeout)
            .parity(serialport::Parity::None)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .open()?;
        debug!("open: {} at {} baud", path, self.baud_rate);
        self.device = Some(device);
        Ok(())
    }

    fn close(&mut self) {
        if self.device.take().is_some() {
            debug!("close: released {:?}", self.path);
        }
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.baud_rate = baud_rate;
        if let Some(device) = self.device.as_mut() {
            device.set_baud_rate(baud_rate)?;
        }
        Ok(())
    }

    fn set_timeouts(
        &mut self,
        mode: TimeoutMode,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<()> {
        // serialport has a single timeout shared by both directions
        let timeout = match mode {
            TimeoutMode::SemiBlockingRead => read_timeout,
            TimeoutMode::ScannerWrite => write_timeout,
        };
        trace!("set_timeouts: {:?} -> {:?}", mode, timeout);
        self.timeout = timeout;
        Ok(self.device()?.set_timeout(timeout)?)
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize> {
        match self.device()?.read(data) {
            Ok(len) => Ok(len),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        Ok(self.device()?.write_all(data)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.device()?.flush()?)
    }
}
