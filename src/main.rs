use arduino_serial::{device::DEFAULT_BAUD_RATE, Arduino, SerialArduino};
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Talk to a microcontroller over a serial port
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Serial port, e.g. /dev/ttyACM0 or COM3
    #[arg(short, long)]
    port: String,

    /// Must match the rate the sketch uses
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Print tokens until the link goes idle, or limit + 1 tokens
    Read {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print limit + 1 tokens parsed as bytes
    ReadBytes { limit: usize },
    /// Send text in one write
    Write { text: String },
    /// Send text in paced chunks
    WriteChunked {
        text: String,
        #[arg(long, default_value_t = 1)]
        chunk_size: usize,
        #[arg(long, default_value_t = 10)]
        delay_ms: u64,
    },
    /// Send a single character
    WriteChar {
        ch: char,
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

fn main() -> Result<(), arduino_serial::Error> {
    env_logger::init();
    let cli = Cli::parse();

    let mut arduino: SerialArduino = Arduino::with_baud_rate(&cli.port, cli.baud)?;
    if !arduino.open_connection() {
        std::process::exit(1);
    }

    match cli.action {
        Action::Read { limit: None } => print!("{}", arduino.read()?),
        Action::Read { limit: Some(limit) } => print!("{}", arduino.read_limited(limit)?),
        Action::ReadBytes { limit } => println!("{:?}", arduino.read_bytes(limit)?),
        Action::Write { text } => arduino.write(&text)?,
        Action::WriteChunked {
            text,
            chunk_size,
            delay_ms,
        } => arduino.write_chunked(&text, chunk_size, Duration::from_millis(delay_ms))?,
        Action::WriteChar { ch, delay_ms: None } => arduino.write_char(ch)?,
        Action::WriteChar {
            ch,
            delay_ms: Some(delay_ms),
        } => arduino.write_char_with_delay(ch, Duration::from_millis(delay_ms))?,
    }

    arduino.close_connection();
    Ok(())
}
