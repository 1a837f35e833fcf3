//! Device channel abstraction for the devinfo identity reader.
//!
//! This crate defines the [`Transport`] port through which the session driver
//! talks to a device, and two implementations of it:
//!
//! - [`SerialTransport`]: an async serial port (8N1, no flow control)
//! - [`MockTransport`]: a scripted channel for tests and development
//!
//! [`AnyTransport`] wraps both so the concrete channel can be chosen at runtime.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use devinfo_transport::{SerialConfig, SerialTransport, Transport};
//!
//! # async fn example() -> devinfo_transport::Result<()> {
//! let mut port = SerialTransport::open(SerialConfig::new("/dev/ttyUSB0"))?;
//! port.transmit(&[0x10, 0x01, 0x19, 0xD6]).await?;
//! let reply = port.receive(4, Duration::from_millis(1000)).await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with a
//! [`TransportError`]. Timeouts are not errors: `receive` returns what it
//! collected before the deadline.

pub mod devices;
pub mod error;
pub mod mock;
pub mod serial;
pub mod traits;
pub mod types;

pub use devices::AnyTransport;
pub use error::{Result, TransportError};
pub use mock::{MockReply, MockTransport, MockTransportHandle};
pub use serial::{PortInfo, SerialTransport, list_ports};
pub use traits::Transport;
pub use types::{SerialConfig, TransportInfo};
