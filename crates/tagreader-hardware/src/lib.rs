//! Reader hardware abstraction layer for the tag reading session controller.
//!
//! This crate defines the capability the session controller consumes from the
//! radio subsystem: opening reader sessions, driving them (begin, restart
//! polling, connect, invalidate) and receiving their lifecycle events. A mock
//! reader is provided so the controller can run without physical hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All session operations are asynchronous using native
//!   `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Event-driven**: Readers never call back into the controller; they send
//!   [`SessionEvent`]s through an [`EventSink`] bound to one session.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All fallible operations return [`Result<T>`][error::Result].
//!
//! # Reading a Tag
//!
//! ```no_run
//! use tagreader_core::PollingOptions;
//! use tagreader_hardware::event::{EventSink, Generation, SessionEventKind};
//! use tagreader_hardware::traits::{ReaderSession, TagReader};
//! use tagreader_hardware::error::Result;
//! use tokio::sync::mpsc;
//!
//! async fn first_identifier<R: TagReader>(reader: &mut R) -> Result<Option<String>> {
//!     let (tx, mut rx) = mpsc::channel(32);
//!     let mut session = reader
//!         .open_session(PollingOptions::all(), EventSink::new(Generation::new(1), tx))
//!         .await?;
//!     session.begin().await?;
//!
//!     while let Some(event) = rx.recv().await {
//!         if let SessionEventKind::TagsDetected(tags) = event.kind {
//!             if let Some(tag) = tags.first() {
//!                 session.connect(tag).await?;
//!                 session.invalidate(None).await;
//!                 return Ok(tag.technology.identifier().map(|id| id.to_hex()));
//!             }
//!         }
//!     }
//!     Ok(None)
//! }
//! ```
//!
//! # Mock Implementations
//!
//! [`MockReader`](mock::MockReader) and its [`MockReaderHandle`](mock::MockReaderHandle)
//! simulate a reader for development and testing.

pub mod devices;
pub mod error;
pub mod event;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyReaderSession, AnyTagReader};
pub use error::{HardwareError, InvalidationError, Result};
pub use event::{EventSink, Generation, SessionEvent, SessionEventKind};
pub use traits::{ReaderSession, TagReader};
pub use types::{MifareFamily, Tag, TagId, TagTechnology};
