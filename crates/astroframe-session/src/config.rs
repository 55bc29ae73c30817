use astroframe_frame::Variant;
use astroframe_transport::SerialConfig;

/// Size of the response window read after every command.
pub const DEFAULT_RESPONSE_MAX_BYTES: usize = 160;

/// Everything needed to open a session with a modem.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Serial line settings and response timing.
    pub serial: SerialConfig,
    /// Frame layout spoken by the modem firmware.
    pub variant: Variant,
    /// Maximum bytes collected per response window.
    pub response_max_bytes: usize,
}

impl SessionConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            serial: SerialConfig::new(port),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            variant: Variant::default(),
            response_max_bytes: DEFAULT_RESPONSE_MAX_BYTES,
        }
    }
}
