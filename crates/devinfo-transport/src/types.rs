//! Common types shared across transport implementations.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use devinfo_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT, DEFAULT_TIMEOUT_MS};

/// Generic transport information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportInfo {
    /// Channel name (e.g., "/dev/ttyUSB0", "Mock Transport").
    pub name: String,

    /// Transport kind (e.g., "serial", "mock").
    pub kind: String,

    /// Baud rate, for serial channels.
    pub baud_rate: Option<u32>,
}

impl TransportInfo {
    /// Create a new TransportInfo with required fields.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            baud_rate: None,
        }
    }

    /// Set the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }
}

impl fmt::Display for TransportInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.baud_rate {
            Some(baud) => write!(f, "{} {} @ {} baud", self.kind, self.name, baud),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// Serial port settings.
///
/// The line is always 8N1 without flow control; only the device path, the
/// baud rate and the per-call timeout vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path or name (e.g., "/dev/ttyUSB0", "COM4").
    pub path: String,

    /// Line speed.
    pub baud_rate: u32,

    /// Timeout applied to each low-level port operation.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Settings for `path` with the default baud rate and timeout.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}
