//! Default tuning values for reading sessions.
//!
//! These constants define the out-of-the-box behavior of the session
//! controller. Most of them can be overridden through the session
//! configuration.
//!
//! # Usage
//!
//! ```
//! use tagreader_core::constants::*;
//! use std::time::Duration;
//!
//! let delay = Duration::from_micros(DEFAULT_REPOLL_DELAY_MICROS);
//! assert_eq!(delay.as_micros(), 500);
//!
//! let message = format!("{}{}", SUCCESS_MESSAGE_PREFIX, "049fab");
//! assert_eq!(message, "Tag with identifier 049fab");
//! ```

// ============================================================================
// Polling
// ============================================================================

/// Delay before polling is restarted after a detection reported no tags
/// (microseconds).
///
/// Keeps the controller from spinning against the radio when the reader
/// wakes up with an empty detection.
pub const DEFAULT_REPOLL_DELAY_MICROS: u64 = 500;

// ============================================================================
// Results
// ============================================================================

/// Prefix of the success message; the identifier hex string follows it.
pub const SUCCESS_MESSAGE_PREFIX: &str = "Tag with identifier ";

// ============================================================================
// Channels and history
// ============================================================================

/// Default capacity of the hardware event and command channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Maximum number of phase transitions kept in a session history.
///
/// A complete read takes 4 to 6 transitions, so this holds the last
/// couple of dozen sessions.
pub const MAX_HISTORY_SIZE: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repoll_delay_is_sub_millisecond() {
        assert!(DEFAULT_REPOLL_DELAY_MICROS < 1_000);
        assert!(DEFAULT_REPOLL_DELAY_MICROS > 0);
    }

    #[test]
    fn test_success_prefix_ends_with_space() {
        assert!(SUCCESS_MESSAGE_PREFIX.ends_with(' '));
    }
}
