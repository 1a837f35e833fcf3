//! Protocol states of the identity query pipeline.
//!
//! # States
//!
//! The pipeline visits the following states in order:
//! - `HaltStream`: Stop any continuous data stream
//! - `GetInterval`: Negotiate the interval base time
//! - `VendorCode`: Query the vendor code
//! - `SerialNumber`: Query the serial number
//! - `HardwareRevision`: Query the hardware revision
//! - `SoftwareRevision`: Query the software revision
//! - `ProductName`: Query the product name
//! - `PartNumber`: Query the part number (terminal)
//!
//! # Transitions
//!
//! - HaltStream → GetInterval on any non-empty answer
//! - GetInterval → VendorCode when byte 0 is ACK, otherwise retry
//! - VendorCode → SerialNumber on the vendor ACK header, otherwise retry
//! - SerialNumber → … → PartNumber one step per ACK
//! - SerialNumber..=PartNumber → HaltStream on NAK (full pipeline reset)
//! - PartNumber + ACK completes the session and stays at PartNumber
//!
//! VendorCode is deliberately asymmetric. Its acknowledgement is the longer
//! `5B 06 0A 14` header over 23 bytes, and a bad answer repeats VendorCode
//! instead of resetting.
//!
//! # Examples
//!
//! ```
//! use devinfo_protocol::{Classification, ProtocolState, Transition};
//!
//! let state = ProtocolState::HaltStream;
//! assert_eq!(state.command().as_bytes(), &[0x10, 0x01, 0x19, 0xD6]);
//!
//! let next = state.transition(Classification::Ack);
//! assert_eq!(next, Transition::Advance(ProtocolState::GetInterval));
//!
//! let reset = ProtocolState::HardwareRevision.transition(Classification::Nak);
//! assert_eq!(reset.target(ProtocolState::HardwareRevision), ProtocolState::HaltStream);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use devinfo_core::{ComponentField, constants::*};

use crate::frame::{CommandFrame, seal};
use crate::pattern::{ByteConstraint, Classification, ResponsePattern};

const HALT_STREAM_FRAME: [u8; 4] = seal([
    COMMAND_PREFIX,
    OP_STOP_CONTINUOUS_DATA,
    STOP_CONTINUOUS_DATA_ARG,
    0x00,
]);

const INTERVAL_FRAME: [u8; 5] = seal([COMMAND_PREFIX, OP_INTERVAL_BASE_TIME, 0x02, 0xFF, 0x00]);

/// Prefix, opcode twice, zero padding, selector, checksum.
const COMPONENT_FRAME_LEN: usize = 3 + COMPONENT_PADDING_LEN + 2;

const fn component_frame(field: ComponentField) -> [u8; COMPONENT_FRAME_LEN] {
    let mut frame = [0x00; COMPONENT_FRAME_LEN];
    frame[0] = COMMAND_PREFIX;
    frame[1] = OP_COMPONENT_INFORMATION;
    frame[2] = OP_COMPONENT_INFORMATION;
    frame[COMPONENT_FRAME_LEN - 2] = field.selector();
    seal(frame)
}

const VENDOR_CODE_FRAME: [u8; COMPONENT_FRAME_LEN] = component_frame(ComponentField::VendorCode);
const SERIAL_NUMBER_FRAME: [u8; COMPONENT_FRAME_LEN] =
    component_frame(ComponentField::SerialNumber);
const HARDWARE_REVISION_FRAME: [u8; COMPONENT_FRAME_LEN] =
    component_frame(ComponentField::HardwareRevision);
const SOFTWARE_REVISION_FRAME: [u8; COMPONENT_FRAME_LEN] =
    component_frame(ComponentField::SoftwareRevision);
const PRODUCT_NAME_FRAME: [u8; COMPONENT_FRAME_LEN] = component_frame(ComponentField::ProductName);
const PART_NUMBER_FRAME: [u8; COMPONENT_FRAME_LEN] = component_frame(ComponentField::PartNumber);

const ANY_BYTES: &[ByteConstraint] = &[];

const INTERVAL_ACK: &[ByteConstraint] = &[(0, ACK)];

const VENDOR_ACK: &[ByteConstraint] = &[
    (0, VENDOR_ACK_HEADER[0]),
    (1, VENDOR_ACK_HEADER[1]),
    (2, VENDOR_ACK_HEADER[2]),
    (3, VENDOR_ACK_HEADER[3]),
];

const COMPONENT_ACK: &[ByteConstraint] = &[
    (0, COMPONENT_ACK_HEADER[0]),
    (1, COMPONENT_ACK_HEADER[1]),
    (2, COMPONENT_ACK_HEADER[2]),
];

const COMPONENT_NAK: &[ByteConstraint] = &[
    (0, COMPONENT_NAK_HEADER[0]),
    (1, COMPONENT_NAK_HEADER[1]),
    (2, COMPONENT_NAK_HEADER[2]),
];

const HALT_STREAM_PATTERN: ResponsePattern = ResponsePattern::new(1, ANY_BYTES, &[]);
const INTERVAL_PATTERN: ResponsePattern = ResponsePattern::new(1, INTERVAL_ACK, &[]);
const VENDOR_PATTERN: ResponsePattern =
    ResponsePattern::new(VENDOR_RESPONSE_LEN, VENDOR_ACK, &[]);
const COMPONENT_PATTERN: ResponsePattern =
    ResponsePattern::new(COMPONENT_RESPONSE_LEN, COMPONENT_ACK, COMPONENT_NAK);

/// One step of the identity query pipeline.
///
/// A state carries no data beyond its identity: it knows what to send and
/// how to judge the answer, nothing else. Values are `Copy` and replaced
/// wholesale on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolState {
    /// Stop the device's continuous data stream.
    HaltStream,

    /// Negotiate the interval base time.
    GetInterval,

    /// Query the vendor code.
    VendorCode,

    /// Query the serial number.
    SerialNumber,

    /// Query the hardware revision.
    HardwareRevision,

    /// Query the software revision.
    SoftwareRevision,

    /// Query the product name.
    ProductName,

    /// Query the part number. Success here completes the session.
    PartNumber,
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ProtocolState {
    /// Every state in pipeline order.
    pub const ALL: [ProtocolState; 8] = [
        ProtocolState::HaltStream,
        ProtocolState::GetInterval,
        ProtocolState::VendorCode,
        ProtocolState::SerialNumber,
        ProtocolState::HardwareRevision,
        ProtocolState::SoftwareRevision,
        ProtocolState::ProductName,
        ProtocolState::PartNumber,
    ];

    /// State every session starts in, and every reset returns to.
    pub const INITIAL: ProtocolState = ProtocolState::HaltStream;

    /// Human readable state name.
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolState::HaltStream => "HaltStream",
            ProtocolState::GetInterval => "GetInterval",
            ProtocolState::VendorCode => "VendorCode",
            ProtocolState::SerialNumber => "SerialNumber",
            ProtocolState::HardwareRevision => "HardwareRevision",
            ProtocolState::SoftwareRevision => "SoftwareRevision",
            ProtocolState::ProductName => "ProductName",
            ProtocolState::PartNumber => "PartNumber",
        }
    }

    /// Position of this state in the pipeline, starting at 0.
    pub fn index(&self) -> usize {
        match self {
            ProtocolState::HaltStream => 0,
            ProtocolState::GetInterval => 1,
            ProtocolState::VendorCode => 2,
            ProtocolState::SerialNumber => 3,
            ProtocolState::HardwareRevision => 4,
            ProtocolState::SoftwareRevision => 5,
            ProtocolState::ProductName => 6,
            ProtocolState::PartNumber => 7,
        }
    }

    /// Identity field queried by this state, if any.
    pub fn component_field(&self) -> Option<ComponentField> {
        match self {
            ProtocolState::HaltStream | ProtocolState::GetInterval => None,
            ProtocolState::VendorCode => Some(ComponentField::VendorCode),
            ProtocolState::SerialNumber => Some(ComponentField::SerialNumber),
            ProtocolState::HardwareRevision => Some(ComponentField::HardwareRevision),
            ProtocolState::SoftwareRevision => Some(ComponentField::SoftwareRevision),
            ProtocolState::ProductName => Some(ComponentField::ProductName),
            ProtocolState::PartNumber => Some(ComponentField::PartNumber),
        }
    }

    /// Whether this state asks for one identity field.
    pub fn is_component_query(&self) -> bool {
        self.component_field().is_some()
    }

    /// Whether a NAK from this state resets the whole pipeline.
    pub fn resets_on_nak(&self) -> bool {
        self.transition(Classification::Nak) == Transition::Reset
    }

    /// Whether an ACK in this state finishes the session.
    pub fn is_terminal(&self) -> bool {
        self.transition(Classification::Ack) == Transition::Complete
    }

    /// Wire bytes sent by this state, checksum included.
    fn wire(&self) -> &'static [u8] {
        match self {
            ProtocolState::HaltStream => &HALT_STREAM_FRAME,
            ProtocolState::GetInterval => &INTERVAL_FRAME,
            ProtocolState::VendorCode => &VENDOR_CODE_FRAME,
            ProtocolState::SerialNumber => &SERIAL_NUMBER_FRAME,
            ProtocolState::HardwareRevision => &HARDWARE_REVISION_FRAME,
            ProtocolState::SoftwareRevision => &SOFTWARE_REVISION_FRAME,
            ProtocolState::ProductName => &PRODUCT_NAME_FRAME,
            ProtocolState::PartNumber => &PART_NUMBER_FRAME,
        }
    }

    /// Opcode bytes sent by this state, checksum excluded.
    pub fn opcode(&self) -> &'static [u8] {
        let wire = self.wire();
        &wire[..wire.len() - 1]
    }

    /// Command frame sent by this state.
    ///
    /// Frames are sealed at compile time; this never allocates.
    pub fn command(&self) -> CommandFrame {
        CommandFrame::from_static(self.wire())
    }

    /// Number of bytes to request from the transport after sending.
    pub fn response_length(&self) -> usize {
        match self {
            ProtocolState::HaltStream => HALT_STREAM_RESPONSE_LEN,
            ProtocolState::GetInterval => INTERVAL_RESPONSE_LEN,
            ProtocolState::VendorCode => VENDOR_RESPONSE_LEN,
            ProtocolState::SerialNumber
            | ProtocolState::HardwareRevision
            | ProtocolState::SoftwareRevision
            | ProtocolState::ProductName
            | ProtocolState::PartNumber => COMPONENT_RESPONSE_LEN,
        }
    }

    /// Classification rule for this state's responses.
    pub fn pattern(&self) -> ResponsePattern {
        match self {
            ProtocolState::HaltStream => HALT_STREAM_PATTERN,
            ProtocolState::GetInterval => INTERVAL_PATTERN,
            ProtocolState::VendorCode => VENDOR_PATTERN,
            ProtocolState::SerialNumber
            | ProtocolState::HardwareRevision
            | ProtocolState::SoftwareRevision
            | ProtocolState::ProductName
            | ProtocolState::PartNumber => COMPONENT_PATTERN,
        }
    }

    /// Classify a response received in this state.
    pub fn classify(&self, response: &[u8]) -> Classification {
        self.pattern().classify(response)
    }

    /// Length of the acknowledgement header preceding the identity payload.
    pub fn ack_header_len(&self) -> usize {
        match self {
            ProtocolState::HaltStream | ProtocolState::GetInterval => 0,
            ProtocolState::VendorCode => VENDOR_ACK_HEADER.len(),
            _ => COMPONENT_ACK_HEADER.len(),
        }
    }

    /// Identity payload carried by an acknowledged response.
    ///
    /// Returns `None` for states that query no identity field.
    pub fn payload<'a>(&self, response: &'a [u8]) -> Option<&'a [u8]> {
        self.component_field()?;
        response.get(self.ack_header_len()..)
    }

    /// Decide what follows a response classified as `classification`.
    pub fn transition(&self, classification: Classification) -> Transition {
        use Classification::{Ack, Incomplete, Nak, Unrecognized};

        match self {
            ProtocolState::HaltStream => match classification {
                Ack => Transition::Advance(ProtocolState::GetInterval),
                Nak | Unrecognized | Incomplete => Transition::Retry,
            },
            ProtocolState::GetInterval => match classification {
                Ack => Transition::Advance(ProtocolState::VendorCode),
                Nak | Unrecognized | Incomplete => Transition::Retry,
            },
            ProtocolState::VendorCode => match classification {
                Ack => Transition::Advance(ProtocolState::SerialNumber),
                Nak | Unrecognized | Incomplete => Transition::Retry,
            },
            ProtocolState::SerialNumber => {
                Self::component_transition(classification, ProtocolState::HardwareRevision)
            }
            ProtocolState::HardwareRevision => {
                Self::component_transition(classification, ProtocolState::SoftwareRevision)
            }
            ProtocolState::SoftwareRevision => {
                Self::component_transition(classification, ProtocolState::ProductName)
            }
            ProtocolState::ProductName => {
                Self::component_transition(classification, ProtocolState::PartNumber)
            }
            ProtocolState::PartNumber => match classification {
                Ack => Transition::Complete,
                Nak => Transition::Reset,
                Unrecognized | Incomplete => Transition::Retry,
            },
        }
    }

    fn component_transition(classification: Classification, next: ProtocolState) -> Transition {
        match classification {
            Classification::Ack => Transition::Advance(next),
            Classification::Nak => Transition::Reset,
            Classification::Unrecognized | Classification::Incomplete => Transition::Retry,
        }
    }
}

impl Default for ProtocolState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Decision taken after classifying a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Move to the given state.
    Advance(ProtocolState),

    /// Stay in the current state and send the same request next tick.
    Retry,

    /// Restart the pipeline from [`ProtocolState::INITIAL`].
    Reset,

    /// The pipeline finished. The state is kept.
    Complete,
}

impl Transition {
    /// State the session is in after applying this transition to `current`.
    pub fn target(&self, current: ProtocolState) -> ProtocolState {
        match self {
            Transition::Advance(next) => *next,
            Transition::Reset => ProtocolState::INITIAL,
            Transition::Retry | Transition::Complete => current,
        }
    }

    /// Whether applying this transition to `current` changes the state.
    pub fn changes_state(&self, current: ProtocolState) -> bool {
        self.target(current) != current
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Advance(next) => write!(f, "advance to {}", next),
            Transition::Retry => write!(f, "retry"),
            Transition::Reset => write!(f, "reset"),
            Transition::Complete => write!(f, "complete"),
        }
    }
}
