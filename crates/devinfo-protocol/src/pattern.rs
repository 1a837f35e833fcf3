//! Response classification.
//!
//! Every protocol step judges the device's answer with a [`ResponsePattern`]:
//! a minimum length plus `(offset, byte)` constraints for the acknowledgement
//! and, where the step has one, the negative acknowledgement. Offsets without
//! a constraint are wildcards.
//!
//! A read shorter than the pattern's minimum length is [`Classification::Incomplete`],
//! not a mismatch. It usually means the transport woke up before the device
//! finished answering, so callers treat it as "try again".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `(offset, expected byte)` requirement.
pub type ByteConstraint = (usize, u8);

/// Outcome of matching a response against a [`ResponsePattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Response carries the step's acknowledgement.
    Ack,

    /// Response carries the step's negative acknowledgement.
    Nak,

    /// Enough bytes arrived but they match neither header.
    Unrecognized,

    /// Fewer bytes arrived than the pattern requires.
    Incomplete,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Classification::Ack => "ack",
            Classification::Nak => "nak",
            Classification::Unrecognized => "unrecognized",
            Classification::Incomplete => "incomplete",
        };
        write!(f, "{}", name)
    }
}

/// Classification rule for one protocol step.
///
/// # Examples
/// ```
/// use devinfo_protocol::{Classification, ResponsePattern};
///
/// const ACK: &[(usize, u8)] = &[(0, 0x06), (1, 0x0A), (2, 0x14)];
/// const NAK: &[(usize, u8)] = &[(0, 0x15), (1, 0x0A), (2, 0x01)];
/// let pattern = ResponsePattern::new(12, ACK, NAK);
///
/// let mut ack = vec![0u8; 12];
/// ack[..3].copy_from_slice(&[0x06, 0x0A, 0x14]);
/// assert_eq!(pattern.classify(&ack), Classification::Ack);
///
/// assert_eq!(pattern.classify(&[0x15, 0x0A, 0x01]), Classification::Nak);
/// assert_eq!(pattern.classify(&[0x06, 0x0A]), Classification::Incomplete);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePattern {
    min_len: usize,
    ack: &'static [ByteConstraint],
    nak: &'static [ByteConstraint],
}

impl ResponsePattern {
    /// Create a pattern. An empty `nak` means the step has no negative
    /// acknowledgement; an empty `ack` accepts any read of `min_len` bytes.
    pub const fn new(
        min_len: usize,
        ack: &'static [ByteConstraint],
        nak: &'static [ByteConstraint],
    ) -> Self {
        Self { min_len, ack, nak }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn ack(&self) -> &'static [ByteConstraint] {
        self.ack
    }

    pub fn nak(&self) -> &'static [ByteConstraint] {
        self.nak
    }

    /// Whether the step defines a negative acknowledgement.
    pub fn has_nak(&self) -> bool {
        !self.nak.is_empty()
    }

    /// Classify `response`.
    ///
    /// A negative acknowledgement header is decisive on its own, even when
    /// the read is shorter than `min_len`. Otherwise short reads are
    /// `Incomplete` and full-length reads are `Ack` or `Unrecognized`.
    pub fn classify(&self, response: &[u8]) -> Classification {
        if self.has_nak() && satisfies(self.nak, response) {
            return Classification::Nak;
        }

        if response.len() < self.min_len {
            return Classification::Incomplete;
        }

        if satisfies(self.ack, response) {
            Classification::Ack
        } else {
            Classification::Unrecognized
        }
    }
}

/// Classify `response` against `pattern`.
pub fn classify(response: &[u8], pattern: &ResponsePattern) -> Classification {
    pattern.classify(response)
}

fn satisfies(constraints: &[ByteConstraint], response: &[u8]) -> bool {
    constraints
        .iter()
        .all(|&(offset, expected)| response.get(offset) == Some(&expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACK: &[ByteConstraint] = &[(0, 0x06), (1, 0x0A), (2, 0x14)];
    const NAK: &[ByteConstraint] = &[(0, 0x15), (1, 0x0A), (2, 0x01)];
    const COMPONENT: ResponsePattern = ResponsePattern::new(12, ACK, NAK);

    fn padded(header: &[u8], len: usize) -> Vec<u8> {
        let mut response = vec![0u8; len];
        response[..header.len()].copy_from_slice(header);
        response
    }

    #[test]
    fn test_full_ack() {
        let response = padded(&[0x06, 0x0A, 0x14], 12);
        assert_eq!(COMPONENT.classify(&response), Classification::Ack);
    }

    #[test]
    fn test_ack_header_in_short_read_is_incomplete() {
        let response = padded(&[0x06, 0x0A, 0x14], 8);
        assert_eq!(COMPONENT.classify(&response), Classification::Incomplete);
    }

    #[test]
    fn test_nak_header_alone_is_nak() {
        assert_eq!(COMPONENT.classify(&[0x15, 0x0A, 0x01]), Classification::Nak);
    }

    #[test]
    fn test_full_length_nak() {
        let response = padded(&[0x15, 0x0A, 0x01], 12);
        assert_eq!(COMPONENT.classify(&response), Classification::Nak);
    }

    #[test]
    fn test_partial_nak_header_is_incomplete() {
        assert_eq!(COMPONENT.classify(&[0x15, 0x0A]), Classification::Incomplete);
    }

    #[test]
    fn test_wrong_header_is_unrecognized() {
        let response = padded(&[0x06, 0x0A, 0x15], 12);
        assert_eq!(COMPONENT.classify(&response), Classification::Unrecognized);
    }

    #[test]
    fn test_empty_read_is_incomplete() {
        assert_eq!(COMPONENT.classify(&[]), Classification::Incomplete);
    }

    #[test]
    fn test_wildcard_ack_accepts_any_bytes() {
        let pattern = ResponsePattern::new(1, &[], &[]);

        assert_eq!(pattern.classify(&[0xFF]), Classification::Ack);
        assert_eq!(pattern.classify(&[0x00, 0x01]), Classification::Ack);
        assert_eq!(pattern.classify(&[]), Classification::Incomplete);
    }

    #[test]
    fn test_pattern_without_nak_never_naks() {
        let pattern = ResponsePattern::new(12, ACK, &[]);
        let response = padded(&[0x15, 0x0A, 0x01], 12);

        assert!(!pattern.has_nak());
        assert_eq!(pattern.classify(&response), Classification::Unrecognized);
    }

    #[test]
    fn test_classify_free_function() {
        let response = padded(&[0x06, 0x0A, 0x14], 12);
        assert_eq!(classify(&response, &COMPONENT), Classification::Ack);
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(Classification::Ack.to_string(), "ack");
        assert_eq!(Classification::Incomplete.to_string(), "incomplete");
    }
}
