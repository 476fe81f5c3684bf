//! Error types for reader hardware operations.
//!
//! [`HardwareError`] covers failures of calls made into the reader
//! (opening a session, connecting to a tag, restarting polling).
//! [`InvalidationError`] is the cause reported by the reader when a session
//! ends, whether abnormally or as the expected result of closing it.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during reader hardware operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// Reader event channel or device has gone away.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Reader cannot start a session.
    #[error("Reader unavailable: {message}")]
    Unavailable { message: String },

    /// Operation attempted on a session that is no longer active.
    #[error("Session is not active")]
    SessionInactive,

    /// Connecting to a detected tag failed.
    #[error("Tag connection failed: {message}")]
    ConnectionFailed { message: String },

    /// Radio communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a new tag connection error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Cause reported by the reader when a session is invalidated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidationError {
    /// The session already delivered its first detection and was closed.
    #[error("First tag already read")]
    FirstTagRead,

    /// The operator dismissed the reading session.
    #[error("Session cancelled by user")]
    UserCanceled,

    /// The session exceeded the platform time limit.
    #[error("Session timeout")]
    SessionTimeout,

    /// The reader terminated the session without a specific cause.
    #[error("Session terminated unexpectedly")]
    TerminatedUnexpectedly,

    /// Another session holds the radio.
    #[error("System is busy")]
    SystemBusy,

    /// Reader specific cause.
    #[error("{0}")]
    Other(String),
}

impl InvalidationError {
    /// Check if this cause is an expected ending that should not be reported
    /// to the caller as a failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagreader_hardware::InvalidationError;
    ///
    /// assert!(InvalidationError::UserCanceled.is_benign());
    /// assert!(InvalidationError::FirstTagRead.is_benign());
    /// assert!(!InvalidationError::SessionTimeout.is_benign());
    /// ```
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::FirstTagRead | Self::UserCanceled)
    }

    /// Check if the operator cancelled the session.
    pub fn is_user_cancellation(&self) -> bool {
        matches!(self, Self::UserCanceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failed_error() {
        let error = HardwareError::connection_failed("Tag was lost");
        assert!(matches!(error, HardwareError::ConnectionFailed { .. }));
        assert_eq!(error.to_string(), "Tag connection failed: Tag was lost");
    }

    #[test]
    fn test_unavailable_error() {
        let error = HardwareError::unavailable("NFC disabled");
        assert_eq!(error.to_string(), "Reader unavailable: NFC disabled");
    }

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("event channel closed");
        assert_eq!(error.to_string(), "Device disconnected: event channel closed");
    }

    #[test]
    fn test_invalidation_benign_causes() {
        assert!(InvalidationError::FirstTagRead.is_benign());
        assert!(InvalidationError::UserCanceled.is_benign());
        assert!(!InvalidationError::SessionTimeout.is_benign());
        assert!(!InvalidationError::TerminatedUnexpectedly.is_benign());
        assert!(!InvalidationError::SystemBusy.is_benign());
        assert!(!InvalidationError::Other("radio fault".to_string()).is_benign());
    }

    #[test]
    fn test_invalidation_display() {
        assert_eq!(InvalidationError::SessionTimeout.to_string(), "Session timeout");
        assert_eq!(
            InvalidationError::Other("radio fault".to_string()).to_string(),
            "radio fault"
        );
    }

    #[test]
    fn test_user_cancellation() {
        assert!(InvalidationError::UserCanceled.is_user_cancellation());
        assert!(!InvalidationError::FirstTagRead.is_user_cancellation());
    }
}
