use bytes::Bytes;

use crate::error::Result;

/// Why a response window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadEnd {
    /// `max_bytes` were received.
    Full,
    /// The line went quiet for the inter-byte timeout after data arrived.
    Gap,
    /// The overall read timeout expired.
    Timeout,
    /// The underlying stream reported end of file.
    Closed,
}

impl ReadEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadEnd::Full => "full",
            ReadEnd::Gap => "gap",
            ReadEnd::Timeout => "timeout",
            ReadEnd::Closed => "closed",
        }
    }
}

/// Bytes collected during one response window.
///
/// A short or empty read is a normal outcome, not an error. Callers that care
/// about silence check [`ReadOutcome::timed_out`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub bytes: Bytes,
    pub end: ReadEnd,
}

impl ReadOutcome {
    pub fn new(bytes: impl Into<Bytes>, end: ReadEnd) -> Self {
        Self {
            bytes: bytes.into(),
            end,
        }
    }

    /// True when the overall timeout closed the window.
    pub fn timed_out(&self) -> bool {
        self.end == ReadEnd::Timeout
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A blocking duplex byte link to the modem.
///
/// One link carries one exchange at a time; implementations are not expected
/// to be shared between threads.
pub trait Link {
    /// Write every byte of `frame` and flush.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Read a response window of at most `max_bytes`.
    fn read_response(&mut self, max_bytes: usize) -> Result<ReadOutcome>;

    /// Human-readable link name for diagnostics.
    fn describe(&self) -> &str {
        "link"
    }
}

impl<L: Link + ?Sized> Link for &mut L {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn read_response(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
        (**self).read_response(max_bytes)
    }

    fn describe(&self) -> &str {
        (**self).describe()
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn read_response(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
        (**self).read_response(max_bytes)
    }

    fn describe(&self) -> &str {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loopback {
        sent: Vec<u8>,
    }

    impl Link for Loopback {
        fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
            self.sent.extend_from_slice(frame);
            Ok(())
        }

        fn read_response(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
            let n = self.sent.len().min(max_bytes);
            let bytes: Vec<u8> = self.sent.drain(..n).collect();
            Ok(ReadOutcome::new(bytes, ReadEnd::Gap))
        }

        fn describe(&self) -> &str {
            "loopback"
        }
    }

    fn write_through<L: Link>(mut link: L, frame: &[u8]) -> String {
        link.write_frame(frame).unwrap();
        link.describe().to_string()
    }

    #[test]
    fn forwards_through_mut_ref_and_box() {
        let mut inner = Loopback { sent: Vec::new() };
        assert_eq!(write_through(&mut inner, &[1, 2, 3]), "loopback");

        let mut boxed: Box<dyn Link> = Box::new(inner);
        let out = boxed.read_response(2).unwrap();
        assert_eq!(out.bytes.as_ref(), &[1, 2]);
        assert!(!out.timed_out());
    }

    #[test]
    fn empty_timeout_outcome_is_reportable() {
        let out = ReadOutcome::new(Vec::new(), ReadEnd::Timeout);
        assert!(out.timed_out());
        assert!(out.is_empty());
        assert_eq!(out.end.as_str(), "timeout");
    }
}
