//! Byte-stream providers the transport runs on

mod serial_comm;
pub use serial_comm::{SerialComm, TimeoutMode, DEFAULT_BAUD_RATE};

#[cfg(feature = "serialport_comm")]
mod serialport_comm;
#[cfg(feature = "serialport_comm")]
pub use serialport_comm::SerialPortComm;

mod mock_comm;
pub use mock_comm::MockComm;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(feature = "serialport_comm")]
    #[error("Serialport error: `{0:?}`")]
    Serialport(serialport::Error),
    #[error("IO error: `{0:?}`")]
    IO(std::io::Error),
    #[error("No port has been bound")]
    Unbound,
    #[error("Port is not open")]
    NotOpen,
    #[error("Communication error: `{0}`")]
    Communication(String),
}

#[cfg(feature = "serialport_comm")]
impl From<serialport::Error> for Error {
    fn from(e: serialport::Error) -> Self {
        Error::Serialport(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IO(e)
    }
}
