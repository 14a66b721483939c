//! End-to-end behaviour of the connection over the in-memory provider

use arduino_serial::{
    device::{MockComm, SerialComm},
    Arduino, ChunkFraming, Config, ConnectionState, Error,
};
use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

fn quick_config() -> Config {
    Config::default()
        .with_settle_delay(Duration::ZERO)
        .with_pre_write_delay(Duration::ZERO)
}

fn open_arduino(port: &MockComm) -> Arduino<MockComm> {
    open_arduino_with(port, quick_config())
}

fn open_arduino_with(port: &MockComm, config: Config) -> Arduino<MockComm> {
    let mut arduino = Arduino::with_device(port.clone()).with_config(config);
    arduino.set_port_description("/dev/ttyACM0").unwrap();
    assert!(arduino.open_connection());
    arduino
}

#[test]
fn test_limited_reads_consume_limit_plus_one() {
    for limit in 0..5 {
        let port = MockComm::new();
        let stream: Vec<String> = (0..12).map(|i| format!("t{}", i)).collect();
        port.enqueue_read(stream.join(" ").as_bytes());
        let mut arduino = open_arduino(&port);

        let text = arduino.read_limited(limit).unwrap();
        assert_eq!(text.lines().count(), limit + 1);

        let slots = arduino.read_array(limit).unwrap();
        assert_eq!(slots.len(), limit + 1);
        let expected: Vec<_> = (limit + 1..2 * limit + 2)
            .map(|i| Some(format!("t{}", i)))
            .collect();
        assert_eq!(slots, expected);
    }
}

#[test]
fn test_read_array_starved_stream() {
    let port = MockComm::new();
    port.enqueue_read(b"only\r\n");
    let mut arduino = open_arduino_with(
        &port,
        quick_config().with_read_timeout(Some(Duration::from_millis(30))),
    );
    assert_eq!(
        arduino.read_array(2).unwrap(),
        vec![Some("only".to_owned()), None, None]
    );
}

#[test]
fn test_limited_reads_wait_for_slow_peer() {
    let port = MockComm::new();
    port.enqueue_read(b"10 ");
    port.enqueue_read_after(Duration::from_millis(150), b"20 ");
    port.enqueue_read_after(Duration::from_millis(300), b"30\r\n");
    let mut arduino =
        open_arduino_with(&port, quick_config().with_idle_timeout(Duration::from_millis(20)));

    let start = Instant::now();
    assert_eq!(
        arduino.read_bytes(2).unwrap(),
        vec![Some(10), Some(20), Some(30)]
    );
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[test]
fn test_read_all_stops_at_idle() {
    let port = MockComm::new();
    port.enqueue_read(b"first ");
    port.enqueue_read_after(Duration::from_millis(300), b"second\r\n");
    let mut arduino =
        open_arduino_with(&port, quick_config().with_idle_timeout(Duration::from_millis(20)));

    assert_eq!(arduino.read().unwrap(), "first\n");
    assert_eq!(arduino.read_limited(0).unwrap(), "second\n");
}

#[test]
fn test_read_bytes_values_and_parse_failure() {
    let port = MockComm::new();
    port.enqueue_read(b"-1\r\n127\r\n-128\r\n");
    let mut arduino = open_arduino(&port);
    assert_eq!(
        arduino.read_bytes(2).unwrap(),
        vec![Some(-1), Some(127), Some(-128)]
    );

    port.enqueue_read(b"5 200 7");
    match arduino.read_bytes(2) {
        Err(Error::Parse(token, _)) => assert_eq!(token, "200"),
        other => panic!("Expected parse error, got: {:?}", other),
    }
}

#[test]
fn test_write_is_unsegmented() {
    let port = MockComm::new();
    let mut arduino = open_arduino(&port);
    let payload = "M 100 200 300 400 500 600 700 800 900".to_owned();
    arduino.write(&payload).unwrap();
    assert_eq!(port.write_log(), vec![payload.into_bytes()]);
}

#[test]
fn test_chunked_write_pacing_and_boundary() {
    let port = MockComm::new();
    let mut arduino = open_arduino(&port);
    let delay = Duration::from_millis(30);

    arduino.write_chunked("abcdefgh", 3, delay).unwrap();

    // "gh" is shorter than a chunk and is not sent; the size marker follows
    let log = port.write_log();
    assert_eq!(log, vec![b"abc".to_vec(), b"def".to_vec(), vec![3u8]]);

    let times = port.write_times();
    assert!(times[1].duration_since(times[0]) >= delay);
    assert!(times[2].duration_since(times[1]) >= delay);
}

#[test]
fn test_chunked_write_exact_framing() {
    let port = MockComm::new();
    let mut arduino = Arduino::<MockComm>::with_device(port.clone())
        .with_config(quick_config().with_chunk_framing(ChunkFraming::EXACT));
    arduino.set_port_description("/dev/ttyACM0").unwrap();
    assert!(arduino.open_connection());

    arduino
        .write_chunked("abcdefgh", 3, Duration::ZERO)
        .unwrap();
    assert_eq!(port.written(), b"abcdefgh");
}

#[test]
fn test_write_char_pauses_after_write() {
    let port = MockComm::new();
    let mut arduino = open_arduino(&port);

    let start = Instant::now();
    arduino
        .write_char_with_delay('x', Duration::from_millis(25))
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(25));
    assert_eq!(port.written(), b"x");
}

#[test]
fn test_pre_write_delay_is_applied() {
    let port = MockComm::new();
    let mut arduino = Arduino::<MockComm>::with_device(port.clone()).with_config(
        quick_config().with_pre_write_delay(Duration::from_millis(20)),
    );
    arduino.set_port_description("/dev/ttyACM0").unwrap();
    assert!(arduino.open_connection());

    let start = Instant::now();
    arduino.write_char('a').unwrap();
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_write_failure_surfaces() {
    let port = MockComm::new();
    let mut arduino = open_arduino(&port);
    port.set_fail_writes(true);
    assert!(matches!(
        arduino.write(&"data".to_owned()),
        Err(Error::Write(_))
    ));
}

#[test]
fn test_failed_open_notifies_once() {
    let port = MockComm::new();
    port.set_fail_open(true);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut arduino = Arduino::<MockComm>::with_device(port.clone())
        .with_notifier(move |title: &str, message: &str| {
            sink.borrow_mut().push((title.to_owned(), message.to_owned()))
        });
    arduino.set_port_description("/dev/ttyUSB9").unwrap();

    assert!(!arduino.open_connection());
    assert_eq!(
        *seen.borrow(),
        vec![("Error Connecting".to_owned(), "Try Another port".to_owned())]
    );
    assert!(!arduino.is_open());
    assert!(!port.is_open());
    assert_eq!(arduino.state(), ConnectionState::Bound);

    // another port works after the failure
    port.set_fail_open(false);
    arduino.set_port_description("/dev/ttyACM0").unwrap();
    assert!(arduino.open_connection());
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_open_waits_for_settle_delay() {
    let port = MockComm::new();
    let settle = Duration::from_millis(40);
    let mut arduino = Arduino::<MockComm>::with_device(port.clone())
        .with_config(quick_config().with_settle_delay(settle));
    arduino.set_port_description("/dev/ttyACM0").unwrap();

    let start = Instant::now();
    assert!(arduino.open_connection());
    assert!(start.elapsed() >= settle);
    assert!(port.is_open());
}

#[test]
fn test_loopback_round_trip() {
    let port = MockComm::new();
    port.set_loopback(true);
    let mut arduino = open_arduino(&port);

    arduino.write(&"42 7 255".to_owned()).unwrap();
    assert_eq!(arduino.read().unwrap(), "42\n7\n255\n");

    arduino.write(&"1 2 3".to_owned()).unwrap();
    assert_eq!(
        arduino.read_bytes(2).unwrap(),
        vec![Some(1), Some(2), Some(3)]
    );

    arduino.write_char('Z').unwrap();
    assert_eq!(arduino.read_array(0).unwrap(), vec![Some("Z".to_owned())]);

    arduino.close_connection();
    assert_eq!(arduino.state(), ConnectionState::Closed);
    assert!(matches!(arduino.read(), Err(Error::NotOpen)));
}
