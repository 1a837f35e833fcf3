//! Error types for session operations.
//!
//! Protocol-level outcomes (NAK, unrecognized or short responses) never show
//! up here: they are absorbed into transitions. Only a broken channel ends a
//! tick with an error.

use devinfo_transport::TransportError;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can end a session tick.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The device channel failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Whether the failure means the device is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            SessionError::Transport(TransportError::Disconnected { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_conversion() {
        let error: SessionError = TransportError::disconnected("/dev/ttyUSB0").into();

        assert!(error.is_disconnect());
        assert_eq!(
            error.to_string(),
            "Transport error: Device disconnected: /dev/ttyUSB0"
        );
    }

    #[test]
    fn test_communication_error_is_not_disconnect() {
        let error = SessionError::from(TransportError::communication("framing"));
        assert!(!error.is_disconnect());
    }
}
