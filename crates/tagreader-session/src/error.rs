//! Error types for the session controller.
//!
//! These errors describe failures of the controller itself. Outcomes of a
//! reading session are reported through
//! [`ReadResult`](tagreader_core::ReadResult) instead.

use crate::state::SessionPhase;
use thiserror::Error;

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors that can occur while running the session controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Phase transition not allowed from the current phase.
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },

    /// Controller task is no longer running.
    #[error("Session controller is not running")]
    Stopped,

    /// Configuration rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Controller task panicked or was aborted.
    #[error("Controller task failed: {0}")]
    TaskFailed(String),
}

impl ControllerError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ControllerError::InvalidTransition {
            from: SessionPhase::Idle,
            to: SessionPhase::Done,
        };
        assert_eq!(err.to_string(), "Invalid phase transition from Idle to Done");

        assert_eq!(
            ControllerError::Stopped.to_string(),
            "Session controller is not running"
        );
        assert_eq!(
            ControllerError::config("channel_capacity must be greater than 0").to_string(),
            "Configuration error: channel_capacity must be greater than 0"
        );
    }
}
