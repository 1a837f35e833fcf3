//! Mock transport implementation for testing and development.
//!
//! This module provides a simulated device channel that can be scripted
//! programmatically, so protocol sessions can run without physical hardware.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::{
    Result, TransportError,
    traits::Transport,
    types::TransportInfo,
};

/// Capacity of the scripted reply channel.
const REPLY_CHANNEL_CAPACITY: usize = 64;

/// One scripted answer for the next `receive` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Bytes the device sends back. Truncated to the requested length.
    Bytes(Bytes),

    /// The device stays silent; `receive` returns no bytes at once.
    Silence,

    /// The channel breaks while reading.
    Fault(String),
}

#[derive(Debug, Default)]
struct MockShared {
    transmitted: Vec<Bytes>,
    transmit_fault: Option<String>,
}

/// Mock transport for testing and development.
///
/// Every `receive` consumes one scripted [`MockReply`]. When nothing is
/// scripted, `receive` waits up to its timeout and returns no bytes, like a
/// silent device. Once every handle is dropped and the script is exhausted,
/// `receive` reports a disconnect.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use devinfo_transport::mock::MockTransport;
/// use devinfo_transport::traits::Transport;
///
/// #[tokio::main]
/// async fn main() -> devinfo_transport::Result<()> {
///     let (mut port, handle) = MockTransport::new();
///
///     handle.reply(vec![0x06, 0x00, 0x00, 0x00, 0x00]).await?;
///
///     port.transmit(&[0x10, 0x02, 0x02, 0xFF, 0xED]).await?;
///     let response = port.receive(5, Duration::from_millis(100)).await?;
///
///     assert_eq!(response[0], 0x06);
///     assert_eq!(handle.transmitted().len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    /// Channel receiver for scripted replies
    reply_rx: mpsc::Receiver<MockReply>,

    /// Frames written so far and pending write faults
    shared: Arc<Mutex<MockShared>>,

    /// Device name
    name: String,
}

impl MockTransport {
    /// Create a new mock transport with the default name.
    ///
    /// Returns a tuple of (MockTransport, MockTransportHandle) where the handle
    /// scripts replies and inspects written frames.
    pub fn new() -> (Self, MockTransportHandle) {
        Self::with_name("Mock Transport".to_string())
    }

    /// Create a new mock transport with a custom name.
    pub fn with_name(name: String) -> (Self, MockTransportHandle) {
        let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
        let shared = Arc::new(Mutex::new(MockShared::default()));

        let transport = Self {
            reply_rx,
            shared: Arc::clone(&shared),
            name: name.clone(),
        };

        let handle = MockTransportHandle {
            reply_tx,
            shared,
            name,
        };

        (transport, handle)
    }
}

impl Transport for MockTransport {
    async fn transmit(&mut self, frame: &[u8]) -> Result<usize> {
        let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(message) = shared.transmit_fault.take() {
            return Err(TransportError::communication(message));
        }
        shared.transmitted.push(Bytes::copy_from_slice(frame));
        Ok(frame.len())
    }

    async fn receive(&mut self, max_len: usize, timeout: Duration) -> Result<Bytes> {
        match tokio::time::timeout(timeout, self.reply_rx.recv()).await {
            Err(_elapsed) => Ok(Bytes::new()),
            Ok(None) => Err(TransportError::disconnected(self.name.as_str())),
            Ok(Some(MockReply::Bytes(bytes))) => Ok(bytes.slice(..bytes.len().min(max_len))),
            Ok(Some(MockReply::Silence)) => Ok(Bytes::new()),
            Ok(Some(MockReply::Fault(message))) => Err(TransportError::communication(message)),
        }
    }

    fn describe(&self) -> TransportInfo {
        TransportInfo::new(self.name.as_str(), "mock")
    }
}

/// Handle for scripting a mock transport.
///
/// It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    /// Channel sender for scripted replies
    reply_tx: mpsc::Sender<MockReply>,

    /// Frames written so far and pending write faults
    shared: Arc<Mutex<MockShared>>,

    /// Device name
    name: String,
}

impl MockTransportHandle {
    /// Queue a reply for a future `receive` call.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped.
    pub async fn send(&self, reply: MockReply) -> Result<()> {
        self.reply_tx
            .send(reply)
            .await
            .map_err(|_| TransportError::disconnected("Mock reply channel closed"))
    }

    /// Queue a reply without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped or the script is full.
    pub fn try_send(&self, reply: MockReply) -> Result<()> {
        self.reply_tx
            .try_send(reply)
            .map_err(|e| TransportError::other(format!("Mock reply not queued: {}", e)))
    }

    /// Queue response bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped.
    pub async fn reply(&self, bytes: impl Into<Bytes>) -> Result<()> {
        self.send(MockReply::Bytes(bytes.into())).await
    }

    /// Queue an empty read.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped.
    pub async fn silence(&self) -> Result<()> {
        self.send(MockReply::Silence).await
    }

    /// Queue a read failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport has been dropped.
    pub async fn fault(&self, message: impl Into<String>) -> Result<()> {
        self.send(MockReply::Fault(message.into())).await
    }

    /// Make the next `transmit` fail with `message`.
    pub fn fail_next_transmit(&self, message: impl Into<String>) {
        self.lock().transmit_fault = Some(message.into());
    }

    /// Frames written so far, oldest first.
    pub fn transmitted(&self) -> Vec<Bytes> {
        self.lock().transmitted.clone()
    }

    /// Number of frames written so far.
    pub fn transmit_count(&self) -> usize {
        self.lock().transmitted.len()
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockShared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
