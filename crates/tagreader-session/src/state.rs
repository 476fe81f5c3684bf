//! Reading session phases and transition tracking.
//!
//! # Phases
//!
//! - `Idle`: No active session
//! - `Polling`: Session open, radio active, waiting for a tag
//! - `Connecting`: A tag was detected and a connect request is outstanding
//! - `Dispatching`: Connected; identifying the technology and extracting the identifier
//! - `Done`: Result delivered, session being torn down
//!
//! # Valid Transitions
//!
//! - Idle → Polling → Connecting → Dispatching → Done → Idle
//! - Polling → Polling (no tag in the field, polling restarted)
//! - Polling → Done and Connecting → Done (hardware failure or cancellation with a result)
//! - Polling/Connecting/Dispatching → Idle (invalidation or silent cancellation)
//!
//! # Examples
//!
//! ```
//! use tagreader_session::{PhaseTracker, SessionPhase};
//!
//! let mut tracker = PhaseTracker::new();
//! assert_eq!(tracker.current(), SessionPhase::Idle);
//!
//! tracker.transition_to(SessionPhase::Polling).unwrap();
//! assert!(tracker.transition_to(SessionPhase::Dispatching).is_err());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tagreader_core::constants::MAX_HISTORY_SIZE;

use crate::error::{ControllerError, Result};

/// Phase of the controller's reading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No active session.
    Idle,

    /// Session opened, radio polling for tags.
    Polling,

    /// Connect request outstanding for the first detected tag.
    Connecting,

    /// Connected; extracting the tag identifier.
    Dispatching,

    /// Terminal result delivered.
    Done,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase_str = match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Polling => "Polling",
            SessionPhase::Connecting => "Connecting",
            SessionPhase::Dispatching => "Dispatching",
            SessionPhase::Done => "Done",
        };
        write!(f, "{}", phase_str)
    }
}

impl SessionPhase {
    /// Check if transition to target phase is valid from this phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagreader_session::SessionPhase;
    ///
    /// assert!(SessionPhase::Idle.can_transition_to(&SessionPhase::Polling));
    /// assert!(SessionPhase::Polling.can_transition_to(&SessionPhase::Polling));
    /// assert!(!SessionPhase::Idle.can_transition_to(&SessionPhase::Done));
    /// ```
    pub fn can_transition_to(&self, target: &SessionPhase) -> bool {
        matches!(
            (self, target),
            // From Idle
            (SessionPhase::Idle, SessionPhase::Polling)
            // From Polling
            | (SessionPhase::Polling, SessionPhase::Polling | SessionPhase::Connecting | SessionPhase::Done)
            // From Connecting
            | (SessionPhase::Connecting, SessionPhase::Dispatching | SessionPhase::Done)
            // From Dispatching
            | (SessionPhase::Dispatching, SessionPhase::Done)
            // From Done
            | (SessionPhase::Done, SessionPhase::Idle)
            // Invalidation or silent close
            | (SessionPhase::Polling | SessionPhase::Connecting | SessionPhase::Dispatching, SessionPhase::Idle)
        )
    }

    /// Check if a session is open in this phase.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionPhase::Polling | SessionPhase::Connecting | SessionPhase::Dispatching
        )
    }
}

/// A single phase transition with timestamp.
///
/// # Serialization Note
///
/// The `timestamp` field is not serialized as `Instant` is process-specific.
/// When deserializing, the timestamp will be set to the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// The phase transitioned from.
    pub from: SessionPhase,

    /// The phase transitioned to.
    pub to: SessionPhase,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl PhaseTransition {
    pub fn new(from: SessionPhase, to: SessionPhase) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Get the duration since this transition occurred.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// Tracks the controller's phase and keeps a bounded transition history.
///
/// # Thread Safety
///
/// This struct is not thread-safe by design. It is owned by the controller
/// task and only observed through the controller's query methods.
#[derive(Debug)]
pub struct PhaseTracker {
    current: SessionPhase,
    entered_at: Instant,
    history: VecDeque<PhaseTransition>,
    max_history: usize,
}

impl PhaseTracker {
    /// Create a tracker in the Idle phase.
    pub fn new() -> Self {
        Self::with_history_limit(MAX_HISTORY_SIZE)
    }

    /// Create a tracker keeping at most `max_history` transitions.
    pub fn with_history_limit(max_history: usize) -> Self {
        Self {
            current: SessionPhase::Idle,
            entered_at: Instant::now(),
            history: VecDeque::with_capacity(max_history.min(MAX_HISTORY_SIZE)),
            max_history,
        }
    }

    pub fn current(&self) -> SessionPhase {
        self.current
    }

    /// Get the time elapsed in the current phase.
    pub fn time_in_current_phase(&self) -> Duration {
        self.entered_at.elapsed()
    }

    /// Recent transitions, ordered from oldest to newest.
    pub fn history(&self) -> &VecDeque<PhaseTransition> {
        &self.history
    }

    /// Get the last N transitions.
    pub fn last_transitions(&self, count: usize) -> Vec<PhaseTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// Transition to a new phase, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::InvalidTransition` if the transition is not
    /// valid from the current phase. The phase is left unchanged.
    pub fn transition_to(&mut self, next: SessionPhase) -> Result<PhaseTransition> {
        if !self.current.can_transition_to(&next) {
            return Err(ControllerError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }

        let transition = PhaseTransition::new(self.current, next);
        self.perform_phase_change(next, transition.clone());
        Ok(transition)
    }

    /// Force the tracker back to Idle regardless of the current phase.
    ///
    /// Returns `None` if the tracker was already Idle.
    pub fn reset(&mut self) -> Option<PhaseTransition> {
        if self.current == SessionPhase::Idle {
            return None;
        }
        let transition = PhaseTransition::new(self.current, SessionPhase::Idle);
        self.perform_phase_change(SessionPhase::Idle, transition.clone());
        Some(transition)
    }

    fn perform_phase_change(&mut self, next: SessionPhase, transition: PhaseTransition) {
        self.current = next;
        self.entered_at = Instant::now();

        self.history.push_back(transition);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn phases(tracker: &PhaseTracker) -> Vec<(SessionPhase, SessionPhase)> {
        tracker.history().iter().map(|t| (t.from, t.to)).collect()
    }

    #[test]
    fn test_new_tracker_starts_idle() {
        let tracker = PhaseTracker::new();
        assert_eq!(tracker.current(), SessionPhase::Idle);
        assert!(tracker.history().is_empty());
    }

    #[test]
    fn test_successful_read_path() {
        let mut tracker = PhaseTracker::new();
        tracker.transition_to(SessionPhase::Polling).unwrap();
        tracker.transition_to(SessionPhase::Connecting).unwrap();
        tracker.transition_to(SessionPhase::Dispatching).unwrap();
        tracker.transition_to(SessionPhase::Done).unwrap();
        tracker.transition_to(SessionPhase::Idle).unwrap();

        assert_eq!(
            phases(&tracker),
            vec![
                (SessionPhase::Idle, SessionPhase::Polling),
                (SessionPhase::Polling, SessionPhase::Connecting),
                (SessionPhase::Connecting, SessionPhase::Dispatching),
                (SessionPhase::Dispatching, SessionPhase::Done),
                (SessionPhase::Done, SessionPhase::Idle),
            ]
        );
    }

    #[test]
    fn test_repoll_self_loop() {
        let mut tracker = PhaseTracker::new();
        tracker.transition_to(SessionPhase::Polling).unwrap();
        tracker.transition_to(SessionPhase::Polling).unwrap();
        tracker.transition_to(SessionPhase::Polling).unwrap();

        assert_eq!(tracker.current(), SessionPhase::Polling);
        assert_eq!(tracker.history().len(), 3);
    }

    #[test]
    fn test_connect_failure_path() {
        let mut tracker = PhaseTracker::new();
        tracker.transition_to(SessionPhase::Polling).unwrap();
        tracker.transition_to(SessionPhase::Connecting).unwrap();
        tracker.transition_to(SessionPhase::Done).unwrap();
        tracker.transition_to(SessionPhase::Idle).unwrap();
        assert_eq!(tracker.current(), SessionPhase::Idle);
    }

    #[test]
    fn test_invalidation_from_any_active_phase() {
        for phase in [
            SessionPhase::Polling,
            SessionPhase::Connecting,
            SessionPhase::Dispatching,
        ] {
            assert!(phase.can_transition_to(&SessionPhase::Idle), "{}", phase);
        }
        assert!(!SessionPhase::Idle.can_transition_to(&SessionPhase::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut tracker = PhaseTracker::new();

        let result = tracker.transition_to(SessionPhase::Connecting);
        assert_eq!(
            result.unwrap_err(),
            ControllerError::InvalidTransition {
                from: SessionPhase::Idle,
                to: SessionPhase::Connecting,
            }
        );
        assert_eq!(tracker.current(), SessionPhase::Idle);

        tracker.transition_to(SessionPhase::Polling).unwrap();
        assert!(tracker.transition_to(SessionPhase::Dispatching).is_err());
        assert_eq!(tracker.current(), SessionPhase::Polling);

        // Done only returns to Idle
        tracker.transition_to(SessionPhase::Done).unwrap();
        assert!(tracker.transition_to(SessionPhase::Polling).is_err());
    }

    #[test]
    fn test_is_active() {
        assert!(!SessionPhase::Idle.is_active());
        assert!(SessionPhase::Polling.is_active());
        assert!(SessionPhase::Connecting.is_active());
        assert!(SessionPhase::Dispatching.is_active());
        assert!(!SessionPhase::Done.is_active());
    }

    #[test]
    fn test_reset() {
        let mut tracker = PhaseTracker::new();
        assert!(tracker.reset().is_none());

        tracker.transition_to(SessionPhase::Polling).unwrap();
        tracker.transition_to(SessionPhase::Connecting).unwrap();

        let transition = tracker.reset().unwrap();
        assert_eq!(transition.from, SessionPhase::Connecting);
        assert_eq!(transition.to, SessionPhase::Idle);
        assert_eq!(tracker.current(), SessionPhase::Idle);
    }

    #[test]
    fn test_history_limit() {
        let mut tracker = PhaseTracker::with_history_limit(4);
        tracker.transition_to(SessionPhase::Polling).unwrap();
        for _ in 0..10 {
            tracker.transition_to(SessionPhase::Polling).unwrap();
        }

        assert_eq!(tracker.history().len(), 4);
        assert!(
            tracker
                .history()
                .iter()
                .all(|t| t.from == SessionPhase::Polling && t.to == SessionPhase::Polling)
        );
    }

    #[test]
    fn test_last_transitions() {
        let mut tracker = PhaseTracker::new();
        tracker.transition_to(SessionPhase::Polling).unwrap();
        tracker.transition_to(SessionPhase::Connecting).unwrap();
        tracker.transition_to(SessionPhase::Dispatching).unwrap();

        let last = tracker.last_transitions(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].to, SessionPhase::Connecting);
        assert_eq!(last[1].to, SessionPhase::Dispatching);

        assert_eq!(tracker.last_transitions(10).len(), 3);
    }

    #[test]
    fn test_time_in_current_phase() {
        let mut tracker = PhaseTracker::new();
        tracker.transition_to(SessionPhase::Polling).unwrap();

        thread::sleep(Duration::from_millis(10));
        assert!(tracker.time_in_current_phase() >= Duration::from_millis(10));

        let transition = tracker.history().back().unwrap();
        assert!(transition.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_phase_display_and_serialization() {
        assert_eq!(SessionPhase::Dispatching.to_string(), "Dispatching");

        let json = serde_json::to_string(&SessionPhase::Polling).unwrap();
        assert_eq!(json, "\"polling\"");
        let phase: SessionPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(phase, SessionPhase::Polling);
    }
}
