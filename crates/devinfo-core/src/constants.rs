//! Wire-level constants for the device identity query protocol.
//!
//! Every command sent to the device has the layout:
//!
//! ```text
//! <PREFIX> <OPCODE...> <CHECKSUM>
//! ```
//!
//! Where:
//! - `PREFIX` - Command prefix byte (0x10)
//! - `OPCODE` - Command-specific bytes
//! - `CHECKSUM` - Two's-complement checksum: the sum of every byte in the
//!   frame, taken modulo 256, is zero
//!
//! Responses are classified by their leading header bytes:
//!
//! | Header | Meaning |
//! |--------|---------|
//! | `06 0A 14` | Component query acknowledged |
//! | `15 0A 01` | Component query rejected |
//! | `5B 06 0A 14` | Vendor code query acknowledged |
//! | `06` | Interval query acknowledged (byte 0 only) |
//!
//! # Usage
//!
//! ```
//! use devinfo_core::constants::*;
//!
//! assert_eq!(COMPONENT_ACK_HEADER[0], ACK);
//! assert_eq!(COMPONENT_NAK_HEADER[0], NAK);
//! ```

// ============================================================================
// Control Bytes
// ============================================================================

/// Positive acknowledgement byte.
pub const ACK: u8 = 0x06;

/// Negative acknowledgement byte.
pub const NAK: u8 = 0x15;

/// Leading byte of every command frame.
pub const COMMAND_PREFIX: u8 = 0x10;

// ============================================================================
// Command Opcodes
// ============================================================================

/// Stop the continuous data stream.
pub const OP_STOP_CONTINUOUS_DATA: u8 = 0x01;

/// Sub-argument sent with the stop-stream command.
pub const STOP_CONTINUOUS_DATA_ARG: u8 = 0x19;

/// Get (and set) the interval base time.
pub const OP_INTERVAL_BASE_TIME: u8 = 0x02;

/// Transmit device component information.
pub const OP_COMPONENT_INFORMATION: u8 = 0x0A;

/// Number of zero padding bytes between the component opcode and its selector.
pub const COMPONENT_PADDING_LEN: usize = 7;

// ============================================================================
// Response Headers
// ============================================================================

/// Acknowledgement header returned by the component query steps.
pub const COMPONENT_ACK_HEADER: [u8; 3] = [ACK, OP_COMPONENT_INFORMATION, 0x14];

/// Negative acknowledgement header returned by the component query steps.
pub const COMPONENT_NAK_HEADER: [u8; 3] = [NAK, OP_COMPONENT_INFORMATION, 0x01];

/// Leading byte of the vendor code acknowledgement.
pub const VENDOR_ACK_MARKER: u8 = 0x5B;

/// Acknowledgement header returned by the vendor code query.
pub const VENDOR_ACK_HEADER: [u8; 4] = [VENDOR_ACK_MARKER, ACK, OP_COMPONENT_INFORMATION, 0x14];

// ============================================================================
// Response Lengths
// ============================================================================

/// Bytes requested after the stop-stream command.
pub const HALT_STREAM_RESPONSE_LEN: usize = 4;

/// Bytes requested after the interval query.
pub const INTERVAL_RESPONSE_LEN: usize = 5;

/// Bytes requested after the vendor code query.
pub const VENDOR_RESPONSE_LEN: usize = 23;

/// Bytes requested after every other component query.
pub const COMPONENT_RESPONSE_LEN: usize = 12;

// ============================================================================
// Transport Defaults
// ============================================================================

/// Baud rate of the reference deployment.
pub const DEFAULT_BAUD_RATE: u32 = 19_200;

/// Per-call receive timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

/// Serial device used when none is configured.
#[cfg(windows)]
pub const DEFAULT_SERIAL_PORT: &str = "COM4";

/// Serial device used when none is configured.
#[cfg(not(windows))]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

// ============================================================================
// Session Limits
// ============================================================================

/// Maximum number of state transitions kept by a session.
pub const MAX_HISTORY_SIZE: usize = 100;

/// Consecutive resets after which the drive loop reports a reset loop.
pub const RESET_LOOP_THRESHOLD: u32 = 5;
