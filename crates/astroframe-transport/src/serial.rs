use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::{read_window, write_all, ReadWindow, TimedRead};
use crate::traits::{Link, ReadOutcome};

/// Line speed of the Astronode UART.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Port opened when none is given.
#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM7";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Serial line settings.
///
/// The defaults match the modem: 9600 baud, 8N1, no flow control, a 3 s
/// response window closed by 1 ms of silence.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub read_timeout: Duration,
    pub inter_byte_timeout: Duration,
}

impl SerialConfig {
    /// Default settings on a specific port.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// The response window these settings describe.
    pub fn window(&self) -> ReadWindow {
        ReadWindow {
            timeout: self.read_timeout,
            inter_byte_timeout: self.inter_byte_timeout,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        let window = ReadWindow::default();
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout: window.timeout,
            inter_byte_timeout: window.inter_byte_timeout,
        }
    }
}

/// An open serial port to the modem.
///
/// The port handle is released when the link is dropped, on every exit path.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    name: String,
    window: ReadWindow,
}

impl SerialLink {
    /// Open and configure the port described by `config`.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let mut port = serialport::new(config.port.as_str(), config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: config.port.clone(),
                source,
            })?;

        // Stale bytes would be read as part of the first response.
        port.clear(ClearBuffer::All)
            .map_err(|source| TransportError::Configure {
                port: config.port.clone(),
                source,
            })?;

        info!(
            port = %config.port,
            baud = config.baud_rate,
            "opened serial port"
        );

        Ok(Self {
            port,
            name: config.port.clone(),
            window: config.window(),
        })
    }

    /// The port this link was opened on.
    pub fn port_name(&self) -> &str {
        &self.name
    }
}

impl TimedRead for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.set_timeout(timeout).map_err(std::io::Error::from)
    }
}

impl Link for SerialLink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        write_all(&mut self.port, frame)?;
        debug!(port = %self.name, len = frame.len(), "frame written");
        Ok(())
    }

    fn read_response(&mut self, max_bytes: usize) -> Result<ReadOutcome> {
        let window = self.window;
        let outcome = read_window(&mut self.port, max_bytes, &window)?;
        debug!(
            port = %self.name,
            len = outcome.bytes.len(),
            end = outcome.end.as_str(),
            "response window closed"
        );
        Ok(outcome)
    }

    fn describe(&self) -> &str {
        &self.name
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        info!(port = %self.name, "closing serial port");
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("port", &self.name)
            .field("window", &self.window)
            .finish()
    }
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
