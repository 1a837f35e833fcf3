//! Transport port trait definition.
//!
//! The session driver reaches the device only through [`Transport`]: one
//! call to send a frame, one call to read up to N bytes within a timeout.
//! Everything below that line (port setup, baud rate, byte-level waiting)
//! belongs to the implementation.
//!
//! The trait uses native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;
use crate::types::TransportInfo;

/// Request/response channel to a single device.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the
/// [`AnyTransport`](crate::devices::AnyTransport) enum when the concrete
/// transport is chosen at runtime.
///
/// # Contract
///
/// - `transmit` writes the whole frame or fails.
/// - `receive` returns at most `max_len` bytes. When `timeout` expires it
///   returns the bytes gathered so far, which may be none. Running out of
///   time is never an error.
/// - Errors mean the channel is broken and are not retried by callers.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use devinfo_transport::traits::Transport;
/// use devinfo_transport::error::Result;
///
/// async fn exchange<T: Transport>(port: &mut T, frame: &[u8]) -> Result<Vec<u8>> {
///     port.transmit(frame).await?;
///     let response = port.receive(12, Duration::from_millis(1000)).await?;
///     Ok(response.to_vec())
/// }
/// ```
pub trait Transport: Send {
    /// Write `frame` to the device, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected
    /// - The device stopped accepting bytes before the whole frame was written
    async fn transmit(&mut self, frame: &[u8]) -> Result<usize>;

    /// Read up to `max_len` bytes, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is disconnected or the read fails.
    /// An expired timeout is not an error.
    async fn receive(&mut self, max_len: usize, timeout: Duration) -> Result<Bytes>;

    /// Describe the underlying channel for logs.
    fn describe(&self) -> TransportInfo;
}
