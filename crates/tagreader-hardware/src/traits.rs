//! Reader hardware trait definitions.
//!
//! These traits are the contract between the session controller and the
//! radio subsystem. A [`TagReader`] opens sessions; a [`ReaderSession`] is
//! driven by the controller while the reader reports lifecycle changes
//! through the [`EventSink`] it was opened with.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::event::EventSink;
use crate::types::Tag;
use tagreader_core::PollingOptions;

/// Tag reader abstraction.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or
/// [`AnyTagReader`](crate::devices::AnyTagReader) when a concrete type is
/// needed (for example to move the reader into a spawned task).
///
/// # Examples
///
/// ```no_run
/// use tagreader_core::PollingOptions;
/// use tagreader_hardware::event::{EventSink, Generation};
/// use tagreader_hardware::traits::{ReaderSession, TagReader};
/// use tagreader_hardware::error::Result;
/// use tokio::sync::mpsc;
///
/// async fn start_polling<R: TagReader>(reader: &mut R) -> Result<R::Session> {
///     let (tx, _rx) = mpsc::channel(32);
///     let sink = EventSink::new(Generation::new(1), tx);
///
///     let mut session = reader.open_session(PollingOptions::all(), sink).await?;
///     session.begin().await?;
///     Ok(session)
/// }
/// ```
pub trait TagReader: Send + Sync {
    /// Session type produced by this reader.
    type Session: ReaderSession;

    /// Check if the device can read tags at all.
    ///
    /// This is a capability check and does not touch the radio.
    fn is_reading_available(&self) -> bool;

    /// Open a session polling for the given families.
    ///
    /// The session does not poll until [`ReaderSession::begin`] is called.
    /// Lifecycle events for the session are sent through `events`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot create a session.
    async fn open_session(
        &mut self,
        polling: PollingOptions,
        events: EventSink,
    ) -> Result<Self::Session>;
}

/// One open reader session.
pub trait ReaderSession: Send + Sync {
    /// Start polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the radio cannot be started.
    async fn begin(&mut self) -> Result<()>;

    /// Restart polling after a detection that should be discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is no longer active.
    async fn restart_polling(&mut self) -> Result<()>;

    /// Connect to a tag reported by the last detection.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag left the field or does not answer.
    async fn connect(&mut self, tag: &Tag) -> Result<()>;

    /// End the session, optionally with a final message for the operator.
    ///
    /// Ending an already ended session does nothing.
    async fn invalidate(&mut self, message: Option<&str>);
}
