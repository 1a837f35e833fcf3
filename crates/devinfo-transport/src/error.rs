//! Error types for transport operations.
//!
//! Every error in this module is fatal for a session: no protocol-level retry
//! repairs a broken channel, so the session driver propagates these to its
//! caller unchanged. Receive timeouts are not errors; an expired timeout
//! yields whatever bytes arrived, possibly none.

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while talking to the device.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The port could not be opened.
    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Port configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new open failure error.
    pub fn open(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Open {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<tokio_serial::Error> for TransportError {
    fn from(err: tokio_serial::Error) -> Self {
        match err.kind() {
            tokio_serial::ErrorKind::NoDevice => Self::disconnected(err.description),
            tokio_serial::ErrorKind::InvalidInput => Self::configuration(err.description),
            tokio_serial::ErrorKind::Io(kind) => Self::Io(std::io::Error::new(kind, err.description)),
            tokio_serial::ErrorKind::Unknown => Self::communication(err.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = TransportError::disconnected("/dev/ttyUSB0");
        assert!(matches!(error, TransportError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: /dev/ttyUSB0");
    }

    #[test]
    fn test_open_error() {
        let error = TransportError::open("COM4", "Access is denied");
        assert_eq!(error.to_string(), "Failed to open COM4: Access is denied");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error: TransportError = io.into();
        assert!(matches!(error, TransportError::Io(_)));
    }

    #[test]
    fn test_serial_error_conversion() {
        let serial = tokio_serial::Error::new(tokio_serial::ErrorKind::NoDevice, "unplugged");
        let error: TransportError = serial.into();
        assert!(matches!(error, TransportError::Disconnected { .. }));
    }
}
