//! Session lifecycle events sent from the reader to the controller.
//!
//! Readers report asynchronous lifecycle changes through an [`EventSink`]
//! handed to them when a session is opened. The sink stamps every event with
//! the [`Generation`] of the session it belongs to, so the receiver can tell
//! late events of a closed session apart from events of the current one.
//!
//! ```text
//! ┌──────────┐  EventSink (gen N)  ┌───────────────┐
//! │ Reader   │────────────────────►│ Event Channel │──────► Controller
//! │ Session  │                     │ (mpsc)        │
//! └──────────┘                     └───────────────┘
//! ```

use crate::error::{HardwareError, InvalidationError, Result};
use crate::types::Tag;
use std::fmt;
use tokio::sync::mpsc;

/// Monotonic token identifying one opened session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The generation following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to a session.
#[derive(Debug, Clone)]
pub enum SessionEventKind {
    /// The radio is active and polling.
    Active,

    /// Polling finished with the given tags, in the order the reader saw
    /// them. May be empty.
    TagsDetected(Vec<Tag>),

    /// The session ended.
    Invalidated(InvalidationError),
}

/// Event emitted by a reader session.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Session the event belongs to.
    pub generation: Generation,

    pub kind: SessionEventKind,
}

/// Sending half of the session event channel, bound to one session.
///
/// # Examples
///
/// ```
/// use tagreader_hardware::event::{EventSink, Generation, SessionEventKind};
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> tagreader_hardware::Result<()> {
///     let (tx, mut rx) = mpsc::channel(8);
///     let sink = EventSink::new(Generation::new(3), tx);
///
///     sink.session_active().await?;
///
///     let event = rx.recv().await.unwrap();
///     assert_eq!(event.generation, Generation::new(3));
///     assert!(matches!(event.kind, SessionEventKind::Active));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    tx: mpsc::Sender<SessionEvent>,
}

impl EventSink {
    pub fn new(generation: Generation, tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the session this sink reports for.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Report that the session became active.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiving side has been dropped.
    pub async fn session_active(&self) -> Result<()> {
        self.emit(SessionEventKind::Active).await
    }

    /// Report the tags found by one polling cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiving side has been dropped.
    pub async fn tags_detected(&self, tags: Vec<Tag>) -> Result<()> {
        self.emit(SessionEventKind::TagsDetected(tags)).await
    }

    /// Report that the session was invalidated.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiving side has been dropped.
    pub async fn invalidated(&self, error: InvalidationError) -> Result<()> {
        self.emit(SessionEventKind::Invalidated(error)).await
    }

    /// Report an invalidation without waiting for channel capacity.
    ///
    /// Used from inside session calls made by the controller itself, where
    /// waiting for the controller to drain the channel would deadlock.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is full or closed.
    pub fn try_invalidated(&self, error: InvalidationError) -> Result<()> {
        self.tx
            .try_send(self.event(SessionEventKind::Invalidated(error)))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    HardwareError::communication("Session event channel full")
                }
                mpsc::error::TrySendError::Closed(_) => {
                    HardwareError::disconnected("Session event channel closed")
                }
            })
    }

    async fn emit(&self, kind: SessionEventKind) -> Result<()> {
        self.tx
            .send(self.event(kind))
            .await
            .map_err(|_| HardwareError::disconnected("Session event channel closed"))
    }

    fn event(&self, kind: SessionEventKind) -> SessionEvent {
        SessionEvent {
            generation: self.generation,
            kind,
        }
    }
}
