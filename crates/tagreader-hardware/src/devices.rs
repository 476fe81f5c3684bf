//! Enum wrappers for reader dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so we cannot use `Box<dyn TagReader>`. These enums give the
//! session controller concrete reader and session types whose futures can be
//! moved into a spawned task.
//!
//! # Examples
//!
//! ```
//! use tagreader_hardware::devices::AnyTagReader;
//! use tagreader_hardware::mock::MockReader;
//! use tagreader_hardware::traits::TagReader;
//!
//! let (reader, _handle) = MockReader::new();
//! let any_reader = AnyTagReader::Mock(reader);
//!
//! assert!(any_reader.is_reading_available());
//! ```

use crate::event::EventSink;
use crate::mock::{MockReader, MockSession};
use crate::traits::{ReaderSession, TagReader};
use crate::types::Tag;
use crate::Result;
use tagreader_core::PollingOptions;

/// Enum wrapper for tag reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTagReader {
    /// Mock reader for development and testing.
    Mock(MockReader),
}

impl TagReader for AnyTagReader {
    type Session = AnyReaderSession;

    fn is_reading_available(&self) -> bool {
        match self {
            Self::Mock(reader) => reader.is_reading_available(),
        }
    }

    async fn open_session(
        &mut self,
        polling: PollingOptions,
        events: EventSink,
    ) -> Result<AnyReaderSession> {
        match self {
            Self::Mock(reader) => reader
                .open_session(polling, events)
                .await
                .map(AnyReaderSession::Mock),
        }
    }
}

/// Enum wrapper for reader session dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyReaderSession {
    /// Session of a mock reader.
    Mock(MockSession),
}

impl ReaderSession for AnyReaderSession {
    async fn begin(&mut self) -> Result<()> {
        match self {
            Self::Mock(session) => session.begin().await,
        }
    }

    async fn restart_polling(&mut self) -> Result<()> {
        match self {
            Self::Mock(session) => session.restart_polling().await,
        }
    }

    async fn connect(&mut self, tag: &Tag) -> Result<()> {
        match self {
            Self::Mock(session) => session.connect(tag).await,
        }
    }

    async fn invalidate(&mut self, message: Option<&str>) {
        match self {
            Self::Mock(session) => session.invalidate(message).await,
        }
    }
}
