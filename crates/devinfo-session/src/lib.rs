//! Session driver for the devinfo identity query pipeline.
//!
//! A [`SessionDriver`] owns one transport and walks the protocol states one
//! request/response exchange per [`tick`](SessionDriver::tick). A
//! [`DriveLoop`] repeats ticks until cancelled.
//!
//! # Example
//!
//! ```no_run
//! use devinfo_session::{DriveLoop, SessionDriver};
//! use devinfo_transport::{SerialConfig, SerialTransport};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let port = SerialTransport::open(SerialConfig::new("/dev/ttyUSB0"))?;
//! let mut driver = SessionDriver::new(port);
//!
//! let summary = DriveLoop::new().run(&mut driver, CancellationToken::new()).await?;
//! println!("{} ticks, identity: {}", summary.ticks, driver.identity());
//! # Ok(())
//! # }
//! ```

pub mod drive_loop;
pub mod driver;
pub mod error;

pub use drive_loop::{DriveLoop, DriveSummary, StopReason};
pub use driver::{
    SessionConfig, SessionDriver, SessionDriverBuilder, SessionStats, StateTransition,
    TickOutcome,
};
pub use error::{Result, SessionError};
