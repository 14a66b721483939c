pub type Result<T> = std::result::Result<T, Error>;

/// An error talking to the microcontroller
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The port could not be opened
    #[error("Connection error: `{0:?}`")]
    Connection(DeviceError),

    /// The provider failed while reading
    #[error("Read error: `{0:?}`")]
    Read(DeviceError),

    /// The provider failed while writing or flushing
    #[error("Write error: `{0:?}`")]
    Write(DeviceError),

    /// A token read in byte mode is not a decimal value in `-128..=127`
    #[error("Could not parse `{0}` as a byte: {1}")]
    Parse(String, std::num::ParseIntError),

    /// A token is not valid UTF-8
    #[error("Invalid text received: `{0:?}`")]
    InvalidText(std::string::FromUtf8Error),

    /// The setting named by the `&str` cannot change while the connection is open
    #[error("Cannot change `{0}` while the connection is open")]
    PortBusy(&'static str),

    #[error("Port description must not be empty")]
    EmptyPortDescription,

    #[error("Connection is not open")]
    NotOpen,

    /// Chunked writes need a chunk size that is non-zero and a valid character code
    #[error("Invalid chunk size `{0}`")]
    InvalidChunkSize(usize),
}

#[derive(Debug)]
pub struct DeviceError(pub crate::device::Error);

impl Error {
    pub(crate) fn read(e: crate::device::Error) -> Self {
        Error::Read(DeviceError(e))
    }

    pub(crate) fn write(e: crate::device::Error) -> Self {
        Error::Write(DeviceError(e))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Error::InvalidText(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::PortBusy("baud rate").to_string(),
            "Cannot change `baud rate` while the connection is open"
        );
        assert_eq!(Error::InvalidChunkSize(0).to_string(), "Invalid chunk size `0`");

        let e = "abc".parse::<u8>().unwrap_err();
        assert!(Error::Parse("abc".to_owned(), e)
            .to_string()
            .starts_with("Could not parse `abc` as a byte"));
    }

    #[test]
    fn test_device_errors_keep_direction() {
        assert!(matches!(
            Error::write(crate::device::Error::NotOpen),
            Error::Write(DeviceError(crate::device::Error::NotOpen))
        ));
        assert!(matches!(
            Error::read(crate::device::Error::NotOpen),
            Error::Read(_)
        ));
    }
}
