//! Frame codec and protocol states for the device identity query pipeline.
//!
//! - [`frame`]: command frames and the two's-complement checksum
//! - [`pattern`]: response patterns and classification
//! - [`state`]: the closed set of protocol states and their transitions

pub mod frame;
pub mod pattern;
pub mod state;

pub use frame::{CommandFrame, build_frame, checksum, seal, to_hex, verify_checksum};
pub use pattern::{ByteConstraint, Classification, ResponsePattern, classify};
pub use state::{ProtocolState, Transition};
