//! Enum wrapper for transport dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn Transport>` is
//! not available. [`AnyTransport`] lets the binary pick the channel at runtime
//! while the session driver stays generic over [`Transport`].
//!
//! # Examples
//!
//! ```
//! use devinfo_transport::devices::AnyTransport;
//! use devinfo_transport::mock::MockTransport;
//! use devinfo_transport::traits::Transport;
//!
//! let (port, _handle) = MockTransport::new();
//! let any_port = AnyTransport::Mock(port);
//!
//! assert_eq!(any_port.describe().kind, "mock");
//! ```

use std::time::Duration;

use bytes::Bytes;

use crate::mock::MockTransport;
use crate::serial::SerialTransport;
use crate::traits::Transport;
use crate::{Result, TransportInfo};

/// Transport chosen at runtime.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTransport {
    /// Physical serial port.
    Serial(SerialTransport),

    /// Scripted channel for development and testing.
    Mock(MockTransport),
}

impl Transport for AnyTransport {
    async fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
        match self {
            Self::Serial(port) => port.transmit(frame).await,
            Self::Mock(port) => port.transmit(frame).await,
        }
    }

    async fn receive(&mut self, max_len: usize, timeout: Duration) -> Result<Bytes> {
        match self {
            Self::Serial(port) => port.receive(max_len, timeout).await,
            Self::Mock(port) => port.receive(max_len, timeout).await,
        }
    }

    fn describe(&self) -> TransportInfo {
        match self {
            Self::Serial(port) => port.describe(),
            Self::Mock(port) => port.describe(),
        }
    }
}

impl From<SerialTransport> for AnyTransport {
    fn from(port: SerialTransport) -> Self {
        Self::Serial(port)
    }
}

impl From<MockTransport> for AnyTransport {
    fn from(port: MockTransport) -> Self {
        Self::Mock(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_dispatch() {
        let (port, handle) = MockTransport::new();
        let mut any_port = AnyTransport::from(port);

        handle.reply(vec![0x06, 0x00]).await.unwrap();
        any_port.transmit(&[0x10, 0x02, 0x02, 0xFF, 0xED]).await.unwrap();
        let response = any_port.receive(5, Duration::from_millis(50)).await.unwrap();

        assert_eq!(&response[..], &[0x06, 0x00]);
        assert_eq!(handle.transmit_count(), 1);
        assert_eq!(any_port.describe().name, "Mock Transport");
    }
}
