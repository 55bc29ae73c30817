/// Errors that can occur during a command exchange.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Link-level error. Aborts the current exchange only.
    #[error("transport error: {0}")]
    Transport(#[from] astroframe_transport::TransportError),

    /// The request could not be encoded, or a response could not be parsed.
    #[error("frame error: {0}")]
    Frame(#[from] astroframe_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
