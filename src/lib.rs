//! Crate for talking to a microcontroller (an Arduino, typically) over a serial link
//!
//! Reads split the inbound stream on whitespace and stop once the link goes idle. Writes go out
//! whole, in paced chunks, or a character at a time, each after a short pause that gives a
//! freshly reset board time to listen.
//!
//! # Usage
//! ```no_run
//! use arduino_serial::{Arduino, SerialArduino};
//!
//! fn main() -> Result<(), arduino_serial::Error> {
//!     let mut arduino: SerialArduino = Arduino::with_baud_rate("/dev/ttyACM0", 9600)?;
//!     if arduino.open_connection() {
//!         arduino.write(&"status".to_owned())?;
//!         println!("{}", arduino.read_limited(3)?);
//!         arduino.close_connection();
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub use config::Config;

pub mod device;

mod error;
pub use error::{DeviceError, Error, Result};

mod interface;
pub use interface::{Arduino, ConnectionState};

pub mod notifier;
pub use notifier::{ConnectionNotifier, LogNotifier};

pub mod reader;

pub mod timeout;

pub mod writer;
pub use writer::ChunkFraming;

/// A connection over a real serial port
#[cfg(feature = "serialport_comm")]
pub type SerialArduino<P = String> = Arduino<device::SerialPortComm, P>;
