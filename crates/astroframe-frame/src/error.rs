/// Errors that can occur while encoding requests or decoding responses.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A hex string could not be decoded (odd digit count, non-hex digit).
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A value cannot be represented in its wire field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The payload does not have the size the opcode requires.
    #[error("{opcode} expects a {expected}-byte payload, got {actual}")]
    PayloadLength {
        opcode: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The opcode is not in the operation table.
    #[error("unsupported opcode 0x{0:02x}")]
    UnsupportedOpcode(u8),

    /// A response is shorter than the smallest valid frame.
    #[error("truncated frame ({len} bytes, need at least {min})")]
    Truncated { len: usize, min: usize },

    /// A legacy response is not bracketed by STX/ETX.
    #[error("missing frame delimiters")]
    BadDelimiter,

    /// A raw response does not start with the header byte.
    #[error("unexpected header byte 0x{0:02x}")]
    BadHeader(u8),

    /// The response checksum does not match its contents.
    #[error("crc mismatch (frame carries 0x{received:04x}, computed 0x{computed:04x})")]
    BadCrc { received: u16, computed: u16 },
}

impl FrameError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for errors caused by malformed caller input, as opposed to an
    /// unknown opcode or a damaged response.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidHex(_)
                | FrameError::InvalidInput(_)
                | FrameError::PayloadLength { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
