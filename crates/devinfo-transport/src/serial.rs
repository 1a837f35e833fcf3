//! Serial port transport.
//!
//! Opens the device as an async serial stream (8N1, no flow control) and
//! implements [`Transport`] on top of it. `transmit` drops unread input
//! before writing, so leftovers from a data stream or an overlong answer never
//! shift the next response window. `receive` keeps reading until the
//! requested number of bytes arrived or the deadline passed, so a device that
//! answers in several bursts still produces one response.

use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use serialport::{SerialPortInfo, SerialPortType};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;
use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream,
    StopBits,
};
use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::Transport;
use crate::types::{SerialConfig, TransportInfo};

const READ_CHUNK: usize = 64;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,

    /// USB vendor ID (if USB device)
    pub vid: Option<u16>,

    /// USB product ID (if USB device)
    pub pid: Option<u16>,

    /// Product name (if available)
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (vid, pid, product) = match info.port_type {
            SerialPortType::UsbPort(usb_info) => {
                (Some(usb_info.vid), Some(usb_info.pid), usb_info.product)
            }
            _ => (None, None, None),
        };

        Self {
            name: info.port_name,
            vid,
            pid,
            product,
        }
    }
}

/// List available serial ports, sorted by name.
///
/// # Errors
///
/// Returns an error if the platform port enumeration fails.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .map_err(TransportError::from)?
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(ports)
}

/// Transport over a serial port.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use devinfo_transport::{SerialConfig, SerialTransport, Transport};
///
/// # async fn example() -> devinfo_transport::Result<()> {
/// let config = SerialConfig::new("/dev/ttyUSB0");
/// let mut port = SerialTransport::open(config)?;
///
/// port.transmit(&[0x10, 0x01, 0x19, 0xD6]).await?;
/// let response = port.receive(4, Duration::from_millis(1000)).await?;
/// println!("{} bytes", response.len());
/// # Ok(())
/// # }
/// ```
pub struct SerialTransport {
    stream: SerialStream,
    config: SerialConfig,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Open and configure the port described by `config`.
    ///
    /// Stale bytes left in the driver buffers are discarded.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Open` if the port cannot be opened.
    pub fn open(config: SerialConfig) -> Result<Self> {
        let stream = tokio_serial::new(config.path.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout)
            .open_native_async()
            .map_err(|e| TransportError::open(config.path.as_str(), e.to_string()))?;

        debug!(path = %config.path, baud = config.baud_rate, "Serial port opened");

        let mut transport = Self::from_stream(stream, config);
        transport.clear_buffers()?;
        Ok(transport)
    }

    /// Wrap an already opened stream.
    ///
    /// `config` is only used for naming and diagnostics; the stream keeps its
    /// own line settings.
    pub fn from_stream(stream: SerialStream, config: SerialConfig) -> Self {
        Self { stream, config }
    }

    /// Discard pending input and output bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejects the request.
    pub fn clear_buffers(&mut self) -> Result<()> {
        self.stream
            .clear(ClearBuffer::All)
            .map_err(TransportError::from)
    }

    /// Settings the port was opened with.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl Transport for SerialTransport {
    async fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
        self.stream
            .clear(ClearBuffer::Input)
            .map_err(TransportError::from)?;

        let path = &self.config.path;
        self.stream
            .write_all(frame)
            .await
            .map_err(|e| map_io(path, e))?;
        self.stream.flush().await.map_err(|e| map_io(path, e))?;

        trace!(bytes = frame.len(), "Frame written");
        Ok(frame.len())
    }

    async fn receive(&mut self, max_len: usize, timeout: Duration) -> Result<Bytes> {
        let deadline = Instant::now() + timeout;
        let mut buffer = BytesMut::with_capacity(max_len);
        let mut chunk = [0u8; READ_CHUNK];

        while buffer.len() < max_len {
            let want = (max_len - buffer.len()).min(READ_CHUNK);

            match tokio::time::timeout_at(deadline, self.stream.read(&mut chunk[..want])).await {
                Err(_elapsed) => break,
                Ok(Ok(0)) => return Err(TransportError::disconnected(self.config.path.as_str())),
                Ok(Ok(n)) => buffer.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => break,
                Ok(Err(e)) => return Err(map_io(&self.config.path, e)),
            }
        }

        if buffer.len() < max_len {
            trace!(
                received = buffer.len(),
                requested = max_len,
                "Receive deadline reached"
            );
        }

        Ok(buffer.freeze())
    }

    fn describe(&self) -> TransportInfo {
        TransportInfo::new(self.config.path.as_str(), "serial").with_baud_rate(self.config.baud_rate)
    }
}

/// `EIO`, reported on unix once a tty has been hung up.
#[cfg(unix)]
const EIO: i32 = 5;

fn map_io(path: &str, err: io::Error) -> TransportError {
    #[cfg(unix)]
    let hung_up = err.raw_os_error() == Some(EIO);
    #[cfg(not(unix))]
    let hung_up = false;

    let lost = hung_up
        || matches!(
            err.kind(),
            io::ErrorKind::BrokenPipe
                | io::ErrorKind::NotConnected
                | io::ErrorKind::UnexpectedEof
                | io::ErrorKind::WriteZero
        );

    if lost {
        warn!(path = %path, error = %err, "Serial device lost");
        TransportError::disconnected(path)
    } else {
        TransportError::Io(err)
    }
}
