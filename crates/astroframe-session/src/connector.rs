use astroframe_transport::SerialLink;
use tracing::info;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::session::Session;

/// Open a session on `port` with default line settings and the raw variant.
pub fn connect(port: impl Into<String>) -> Result<Session<SerialLink>> {
    connect_with_config(&SessionConfig::new(port))
}

/// Open a session with explicit configuration.
///
/// The serial port is closed when the returned session is dropped.
pub fn connect_with_config(config: &SessionConfig) -> Result<Session<SerialLink>> {
    let link = SerialLink::open(&config.serial)?;
    info!(
        port = link.port_name(),
        variant = %config.variant,
        response_max_bytes = config.response_max_bytes,
        "session ready"
    );
    Ok(Session::with_codec(
        link,
        config.variant.codec(),
        config.response_max_bytes,
    ))
}
