use super::Result;
use std::time::Duration;

/// The rate most Arduino sketches call `Serial.begin` with
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

/// Timeout behaviour requested from the provider before each operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutMode {
    /// Block until at least one byte is available, then return what is there
    SemiBlockingRead,
    /// Writes only; no read timeout semantics
    ScannerWrite,
}

/// An API to communicate with a serial device
///
/// This is the whole surface the transport needs from a provider: binding to a port identifier,
/// open/close, baud rate, per-operation timeouts, and a byte stream in each direction.
pub trait SerialComm {
    /// Re-resolve the handle to a new port, discarding any open state
    fn bind(&mut self, port: &str);
    fn open(&mut self) -> Result<()>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()>;
    fn set_timeouts(
        &mut self,
        mode: TimeoutMode,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<()>;

    /// Read whatever is available
    ///
    /// Returning `Ok(0)` means the link went idle under the current timeout mode.
    fn read(&mut self, data: &mut [u8]) -> Result<usize>;
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}
