use super::serial_comm::{SerialComm, TimeoutMode, DEFAULT_BAUD_RATE};
use super::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct MockState {
    port: Option<String>,
    baud_rate: u32,
    open: bool,
    loopback: bool,
    fail_open: bool,
    fail_writes: bool,
    read_queue: VecDeque<u8>,
    pending: VecDeque<(Instant, Vec<u8>)>,
    read_timeout: Duration,
    writes: Vec<(Instant, Vec<u8>)>,
    flushes: usize,
    timeouts: Vec<(TimeoutMode, Duration, Duration)>,
}

impl MockState {
    fn release_due(&mut self) {
        let now = Instant::now();
        while self.pending.front().is_some_and(|(due, _)| *due <= now) {
            if let Some((_, data)) = self.pending.pop_front() {
                self.read_queue.extend(data);
            }
        }
    }

    fn drain_into(&mut self, data: &mut [u8]) -> usize {
        let len = data.len().min(self.read_queue.len());
        for (slot, b) in data.iter_mut().zip(self.read_queue.drain(..len)) {
            *slot = b;
        }
        len
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            open: false,
            loopback: false,
            fail_open: false,
            fail_writes: false,
            read_queue: VecDeque::new(),
            pending: VecDeque::new(),
            read_timeout: Duration::from_millis(1000),
            writes: Vec::new(),
            flushes: 0,
            timeouts: Vec::new(),
        }
    }
}

/// In-memory provider for exercising the transport without hardware
///
/// Clones share state, so a test can hand one clone to the transport and keep another to script
/// reads and inspect what was written. An empty read queue reads as an idle link (`Ok(0)`). Bursts
/// queued with [enqueue_read_after](Self::enqueue_read_after) model a slow peer: while one is due,
/// an idle read sleeps up to the read timeout first, like a real port would.
///
/// ```
/// use arduino_serial::device::{MockComm, SerialComm};
///
/// let mut port = MockComm::new();
/// port.bind("MOCK0");
/// port.open().unwrap();
/// port.enqueue_read(b"21 22");
///
/// let mut buf = [0u8; 8];
/// assert_eq!(port.read(&mut buf).unwrap(), 5);
/// assert_eq!(port.read(&mut buf).unwrap(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockComm {
    state: Arc<Mutex<MockState>>,
}

impl MockComm {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue bytes the peer "sends"
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state().read_queue.extend(data);
    }

    /// Queue bytes the peer "sends" once `delay` has passed
    pub fn enqueue_read_after(&self, delay: Duration, data: &[u8]) {
        let mut state = self.state();
        let due = Instant::now() + delay;
        let at = state.pending.partition_point(|(d, _)| *d <= due);
        state.pending.insert(at, (due, data.to_vec()));
    }

    /// Longest time an idle read sleeps while a burst is due
    pub fn set_read_timeout(&self, timeout: Duration) {
        self.state().read_timeout = timeout;
    }

    /// Echo every write back into the read queue
    pub fn set_loopback(&self, loopback: bool) {
        self.state().loopback = loopback;
    }

    /// Make the next calls to `open` fail as if the port were missing
    pub fn set_fail_open(&self, fail: bool) {
        self.state().fail_open = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Each `write_all` call in order
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state().writes.iter().map(|(_, w)| w.clone()).collect()
    }

    /// When each `write_all` call happened
    pub fn write_times(&self) -> Vec<Instant> {
        self.state().writes.iter().map(|(t, _)| *t).collect()
    }

    /// Everything written, concatenated
    pub fn written(&self) -> Vec<u8> {
        self.state()
            .writes
            .iter()
            .flat_map(|(_, w)| w.iter().copied())
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.state().flushes
    }

    pub fn timeout_log(&self) -> Vec<(TimeoutMode, Duration, Duration)> {
        self.state().timeouts.clone()
    }

    pub fn available_bytes(&self) -> usize {
        self.state().read_queue.len()
    }

    pub fn port(&self) -> Option<String> {
        self.state().port.clone()
    }

    pub fn baud_rate(&self) -> u32 {
        self.state().baud_rate
    }
}

impl SerialComm for MockComm {
    fn bind(&mut self, port: &str) {
        let mut state = self.state();
        state.open = false;
        state.port = Some(port.to_owned());
    }

    fn open(&mut self) -> Result<()> {
        let mut state = self.state();
        let Some(port) = state.port.clone() else {
            return Err(Error::Unbound);
        };
        if state.fail_open {
            return Err(Error::Communication(format!("{} is unavailable", port)));
        }
        state.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state().open = false;
    }

    fn is_open(&self) -> bool {
        self.state().open
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.state().baud_rate = baud_rate;
        Ok(())
    }

    fn set_timeouts(
        &mut self,
        mode: TimeoutMode,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            return Err(Error::NotOpen);
        }
        if mode == TimeoutMode::SemiBlockingRead {
            state.read_timeout = read_timeout;
        }
        state.timeouts.push((mode, read_timeout, write_timeout));
        Ok(())
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize> {
        let sleep = {
            let mut state = self.state();
            if !state.open {
                return Err(Error::NotOpen);
            }
            state.release_due();
            if !state.read_queue.is_empty() {
                return Ok(state.drain_into(data));
            }
            match state.pending.front() {
                Some((due, _)) => due
                    .saturating_duration_since(Instant::now())
                    .min(state.read_timeout),
                None => return Ok(0),
            }
        };
        thread::sleep(sleep);

        let mut state = self.state();
        state.release_due();
        Ok(state.drain_into(data))
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            return Err(Error::NotOpen);
        }
        if state.fail_writes {
            return Err(Error::IO(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        if state.loopback {
            state.read_queue.extend(data);
        }
        state.writes.push((Instant::now(), data.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let mut state = self.state();
        if !state.open {
            return Err(Error::NotOpen);
        }
        state.flushes += 1;
        Ok(())
    }
}
