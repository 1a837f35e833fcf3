use bytes::{BufMut, Bytes, BytesMut};
use devinfo_core::{Error, Result};
use std::fmt;

/// Two's-complement checksum of `bytes`.
///
/// Appending the returned byte to `bytes` makes the total byte sum zero
/// modulo 256.
///
/// # Examples
/// ```
/// use devinfo_protocol::frame::checksum;
///
/// assert_eq!(checksum(&[0x10, 0x02, 0x02, 0xFF]), 0xED);
/// assert_eq!(checksum(&[]), 0x00);
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    byte_sum(bytes).wrapping_neg()
}

/// Sum of `bytes` modulo 256.
pub fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Fill the last byte of `frame` with the checksum of the bytes before it.
///
/// Usable in constants, so fixed frames are built at compile time.
pub const fn seal<const N: usize>(mut frame: [u8; N]) -> [u8; N] {
    assert!(N > 0, "frame must have room for a checksum byte");

    let mut sum = 0u8;
    let mut i = 0;
    while i < N - 1 {
        sum = sum.wrapping_add(frame[i]);
        i += 1;
    }
    frame[N - 1] = sum.wrapping_neg();
    frame
}

/// Whether `bytes`, checksum included, sum to zero modulo 256.
///
/// An empty slice carries no checksum and is never valid.
pub fn verify_checksum(bytes: &[u8]) -> bool {
    !bytes.is_empty() && byte_sum(bytes) == 0
}

/// Render bytes as space separated upper-case hex, e.g. `10 01 19 D6`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// CommandFrame is one outgoing request in its exact wire form.
///
/// The last byte is always the checksum of the preceding opcode bytes, so
/// every frame satisfies `sum(bytes) mod 256 == 0`. Frames are immutable and
/// cheap to clone.
///
/// # Wire Format
/// ```text
/// 10 02 02 FF ED
/// ^^^^^^^^^^^ ^^
/// opcode      checksum
/// ```
///
/// # Basic Usage
/// ```
/// use devinfo_protocol::CommandFrame;
///
/// let frame = CommandFrame::build(&[0x10, 0x02, 0x02, 0xFF]);
/// assert_eq!(frame.as_bytes(), &[0x10, 0x02, 0x02, 0xFF, 0xED]);
/// assert_eq!(frame.checksum(), 0xED);
/// assert!(frame.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandFrame {
    /// Opcode bytes followed by the checksum byte
    data: Bytes,
}

impl CommandFrame {
    /// Build a frame by appending the checksum to `opcode`.
    pub fn build(opcode: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(opcode.len() + 1);
        buf.put_slice(opcode);
        buf.put_u8(checksum(opcode));

        CommandFrame { data: buf.freeze() }
    }

    /// Wrap a static frame produced by [`seal`] without copying it.
    pub(crate) const fn from_static(sealed: &'static [u8]) -> Self {
        CommandFrame {
            data: Bytes::from_static(sealed),
        }
    }

    /// Wrap bytes that already carry a trailing checksum.
    ///
    /// # Errors
    /// Returns `Error::InvalidFrame` for an empty slice and
    /// `Error::ChecksumMismatch` when the trailing byte is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let Some((&actual, opcode)) = bytes.split_last() else {
            return Err(Error::invalid_frame("frame must contain a checksum byte"));
        };

        let expected = checksum(opcode);
        if actual != expected {
            return Err(Error::ChecksumMismatch { expected, actual });
        }

        Ok(CommandFrame {
            data: Bytes::copy_from_slice(bytes),
        })
    }

    /// Get the raw bytes of the frame, checksum included
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the frame size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Opcode bytes without the checksum
    pub fn opcode(&self) -> &[u8] {
        &self.data[..self.data.len() - 1]
    }

    /// Trailing checksum byte
    pub fn checksum(&self) -> u8 {
        self.data[self.data.len() - 1]
    }

    /// Check the frame's byte sum invariant.
    pub fn is_valid(&self) -> bool {
        verify_checksum(&self.data)
    }

    /// Shareable handle to the underlying bytes
    pub fn to_bytes(&self) -> Bytes {
        self.data.clone()
    }
}

impl AsRef<[u8]> for CommandFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", to_hex(&self.data))
    }
}

/// Build a command frame from opcode bytes.
///
/// Shorthand for [`CommandFrame::build`].
pub fn build_frame(opcode: &[u8]) -> CommandFrame {
    CommandFrame::build(opcode)
}
