//! Session controller configuration.
//!
//! # Examples
//!
//! ```
//! use tagreader_session::SessionConfig;
//! use std::time::Duration;
//!
//! let config: SessionConfig = serde_json::from_str(r#"{ "report_cancellation": true }"#).unwrap();
//! assert!(config.report_cancellation);
//! assert_eq!(config.repoll_delay(), Duration::from_micros(500));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tagreader_core::PollingOptions;
use tagreader_core::constants::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_REPOLL_DELAY_MICROS, MAX_HISTORY_SIZE,
};

use crate::error::{ControllerError, Result};

/// Configuration for a [`SessionController`](crate::SessionController).
///
/// Missing fields take their default values when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tag families the reader polls for.
    pub polling: PollingOptions,

    /// Delay before polling restarts after an empty detection (microseconds).
    pub repoll_delay_micros: u64,

    /// Deliver `Cancelled` to the caller when the operator or `cancel()`
    /// ends a session. When false, such sessions end without a result.
    pub report_cancellation: bool,

    /// Capacity of the command and hardware event channels.
    pub channel_capacity: usize,

    /// Number of phase transitions kept for inspection.
    pub history_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            polling: PollingOptions::all(),
            repoll_delay_micros: DEFAULT_REPOLL_DELAY_MICROS,
            report_cancellation: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            history_size: MAX_HISTORY_SIZE,
        }
    }
}

impl SessionConfig {
    pub fn repoll_delay(&self) -> Duration {
        Duration::from_micros(self.repoll_delay_micros)
    }

    /// Check the configuration for values the controller cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.polling.is_empty() {
            return Err(ControllerError::config(
                "polling must enable at least one tag family",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ControllerError::config(
                "channel_capacity must be greater than 0",
            ));
        }
        if self.history_size == 0 {
            return Err(ControllerError::config("history_size must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tagreader_core::PollingOption;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.polling, PollingOptions::all());
        assert_eq!(config.repoll_delay(), Duration::from_micros(500));
        assert!(!config.report_cancellation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "polling": { "iso14443": true, "iso15693": false, "iso18092": false },
            "repoll_delay_micros": 2000
        }"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();

        assert!(config.polling.contains(PollingOption::Iso14443));
        assert!(!config.polling.contains(PollingOption::Iso18092));
        assert_eq!(config.repoll_delay(), Duration::from_millis(2));
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[rstest]
    #[case::no_polling(SessionConfig { polling: PollingOptions::none(), ..Default::default() }, "polling")]
    #[case::zero_capacity(SessionConfig { channel_capacity: 0, ..Default::default() }, "channel_capacity")]
    #[case::zero_history(SessionConfig { history_size: 0, ..Default::default() }, "history_size")]
    fn test_invalid_config(#[case] config: SessionConfig, #[case] field: &str) {
        match config.validate() {
            Err(ControllerError::Config(message)) => assert!(message.contains(field)),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
