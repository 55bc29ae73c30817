use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{ReadEnd, ReadOutcome};

const READ_CHUNK_SIZE: usize = 256;

/// A reader whose per-call blocking time can be adjusted.
///
/// Serial ports expose a single read timeout; the response window is built
/// by shrinking it once the first byte has arrived.
pub trait TimedRead: Read {
    fn set_read_timeout(&mut self, timeout: Duration) -> std::io::Result<()>;
}

/// Timing rules for one response window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadWindow {
    /// Upper bound on the whole window.
    pub timeout: Duration,
    /// Silence after the last received byte that closes the window.
    pub inter_byte_timeout: Duration,
}

impl Default for ReadWindow {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            inter_byte_timeout: Duration::from_millis(1),
        }
    }
}

/// Collect up to `max_bytes` from `reader` under `window` timing.
///
/// Never fails on silence: an empty buffer with [`ReadEnd::Timeout`] is a
/// valid outcome.
pub fn read_window<R: TimedRead + ?Sized>(
    reader: &mut R,
    max_bytes: usize,
    window: &ReadWindow,
) -> Result<ReadOutcome> {
    let deadline = Instant::now() + window.timeout;
    let mut buf = Vec::with_capacity(max_bytes);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while buf.len() < max_bytes {
        let now = Instant::now();
        if now >= deadline {
            return Ok(ReadOutcome::new(buf, ReadEnd::Timeout));
        }
        let remaining = deadline - now;
        let wait = if buf.is_empty() {
            remaining
        } else {
            window.inter_byte_timeout.min(remaining)
        };
        reader.set_read_timeout(wait)?;

        let want = (max_bytes - buf.len()).min(READ_CHUNK_SIZE);
        match reader.read(&mut chunk[..want]) {
            Ok(0) => return Ok(ReadOutcome::new(buf, ReadEnd::Closed)),
            Ok(n) => {
                trace!(n, total = buf.len() + n, "response bytes received");
                buf.extend_from_slice(&chunk[..n]);
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                if !buf.is_empty() {
                    return Ok(ReadOutcome::new(buf, ReadEnd::Gap));
                }
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    Ok(ReadOutcome::new(buf, ReadEnd::Full))
}

/// Write every byte of `data`, retrying interrupted and would-block writes,
/// then flush.
pub fn write_all<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < data.len() {
        match writer.write(&data[offset..]) {
            Ok(0) => {
                return Err(TransportError::Closed {
                    written: offset,
                    len: data.len(),
                })
            }
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    enum Step {
        Data(Vec<u8>),
        Silence,
        Interrupt,
        Fail,
    }

    struct ScriptedPort {
        steps: VecDeque<Step>,
        timeouts: Vec<Duration>,
    }

    impl ScriptedPort {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
                timeouts: Vec::new(),
            }
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.steps.pop_front() {
                Some(Step::Data(mut bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    if n < bytes.len() {
                        self.steps.push_front(Step::Data(bytes.split_off(n)));
                    }
                    Ok(n)
                }
                Some(Step::Silence) => Err(std::io::Error::from(ErrorKind::TimedOut)),
                Some(Step::Interrupt) => Err(std::io::Error::from(ErrorKind::Interrupted)),
                Some(Step::Fail) => Err(std::io::Error::from(ErrorKind::BrokenPipe)),
                None => Ok(0),
            }
        }
    }

    impl TimedRead for ScriptedPort {
        fn set_read_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
            self.timeouts.push(timeout);
            Ok(())
        }
    }

    fn window() -> ReadWindow {
        ReadWindow {
            timeout: Duration::from_secs(5),
            inter_byte_timeout: Duration::from_millis(1),
        }
    }

    #[test]
    fn closes_on_gap_after_first_byte() {
        let mut port = ScriptedPort::new(vec![
            Step::Data(vec![0x7f, 0xa5]),
            Step::Data(vec![0x00]),
            Step::Silence,
            Step::Data(vec![0xff]),
        ]);

        let out = read_window(&mut port, 160, &window()).unwrap();
        assert_eq!(out.bytes.as_ref(), &[0x7f, 0xa5, 0x00]);
        assert_eq!(out.end, ReadEnd::Gap);
        assert!(port.timeouts[0] > Duration::from_secs(4));
        assert_eq!(port.timeouts[1], Duration::from_millis(1));
    }

    #[test]
    fn stops_at_max_bytes() {
        let mut port = ScriptedPort::new(vec![Step::Data(vec![1, 2, 3, 4, 5, 6])]);
        let out = read_window(&mut port, 4, &window()).unwrap();
        assert_eq!(out.bytes.as_ref(), &[1, 2, 3, 4]);
        assert_eq!(out.end, ReadEnd::Full);
    }

    #[test]
    fn zero_timeout_is_an_empty_timeout_not_an_error() {
        let mut port = ScriptedPort::new(vec![Step::Data(vec![1])]);
        let cfg = ReadWindow {
            timeout: Duration::ZERO,
            ..window()
        };
        let out = read_window(&mut port, 160, &cfg).unwrap();
        assert!(out.timed_out());
        assert!(out.is_empty());
    }

    #[test]
    fn silence_before_first_byte_keeps_waiting() {
        let mut port = ScriptedPort::new(vec![
            Step::Silence,
            Step::Interrupt,
            Step::Data(vec![0x02, 0x03]),
            Step::Silence,
        ]);
        let out = read_window(&mut port, 160, &window()).unwrap();
        assert_eq!(out.bytes.as_ref(), &[0x02, 0x03]);
        assert_eq!(out.end, ReadEnd::Gap);
    }

    #[test]
    fn end_of_stream_is_reported_as_closed() {
        let mut port = ScriptedPort::new(vec![Step::Data(vec![9])]);
        let out = read_window(&mut port, 160, &window()).unwrap();
        assert_eq!(out.bytes.as_ref(), &[9]);
        assert_eq!(out.end, ReadEnd::Closed);
    }

    #[test]
    fn hard_read_errors_propagate() {
        let mut port = ScriptedPort::new(vec![Step::Fail]);
        let err = read_window(&mut port, 160, &window()).unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn write_all_flushes() {
        let mut sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        write_all(&mut sink, &[0x7f, 0x01]).unwrap();
        assert_eq!(sink.data, vec![0x7f, 0x01]);
        assert!(flag.load(Ordering::SeqCst));
    }

    struct HiccupWriter {
        hiccups: VecDeque<ErrorKind>,
        flush_hiccup: bool,
        data: Vec<u8>,
    }

    impl Write for HiccupWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(kind) = self.hiccups.pop_front() {
                return Err(std::io::Error::from(kind));
            }
            // One byte per call to exercise the offset loop.
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if self.flush_hiccup {
                self.flush_hiccup = false;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    #[test]
    fn write_all_retries_interrupted_and_would_block() {
        let mut writer = HiccupWriter {
            hiccups: VecDeque::from([ErrorKind::Interrupted, ErrorKind::WouldBlock]),
            flush_hiccup: true,
            data: Vec::new(),
        };
        write_all(&mut writer, b"0123").unwrap();
        assert_eq!(writer.data, b"0123");
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_all_reports_closed_link() {
        let err = write_all(&mut ZeroWriter, b"x").unwrap_err();
        assert!(matches!(err, TransportError::Closed { written: 0, len: 1 }));
    }
}
