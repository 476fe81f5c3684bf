//! Failure taxonomy for tag reading sessions.
//!
//! Every failure a reading session can produce maps to exactly one
//! [`ReaderError`] variant. Failures are always values delivered to the
//! session's completion callback; nothing here is fatal to the host process.

use thiserror::Error;

/// Terminal outcome of a reading session.
///
/// `Ok` carries the human readable success message built from the tag
/// identifier.
pub type ReadResult = std::result::Result<String, ReaderError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    /// The device has no tag reading capability.
    #[error("Tag reading is not available on this device")]
    Unavailable,

    /// The detected tag uses a technology the controller does not handle.
    #[error("Tag technology not supported")]
    NotSupported,

    /// The session ended abnormally.
    #[error("Session invalidated: {description}")]
    Invalidated { description: String },

    /// The session was cancelled by the operator or by the caller.
    #[error("Session cancelled")]
    Cancelled,

    /// A reading session is already in progress.
    #[error("A reading session is already active")]
    Busy,

    /// Catch-all failure.
    #[error("Tag reading failed")]
    Generic,
}

impl ReaderError {
    /// Create an invalidation error.
    ///
    /// An empty description is replaced with a generic one so that
    /// `Invalidated` never carries an empty cause.
    pub fn invalidated(description: impl Into<String>) -> Self {
        let description = description.into();
        let description = if description.trim().is_empty() {
            "unknown cause".to_string()
        } else {
            description
        };
        Self::Invalidated { description }
    }

    /// Description carried by an `Invalidated` error.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Invalidated { description } => Some(description),
            _ => None,
        }
    }
}
