//! Mock tag reader implementation for testing and development.
//!
//! This module provides a simulated reader whose radio side is driven
//! programmatically through a [`MockReaderHandle`], so the session controller
//! can be exercised without physical hardware.

use crate::{
    Result,
    error::{HardwareError, InvalidationError},
    event::{EventSink, Generation},
    traits::{ReaderSession, TagReader},
    types::{Tag, TagId, TagTechnology},
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tagreader_core::PollingOptions;
use tracing::debug;

/// A call the controller made into the mock reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCall {
    OpenSession { polling: PollingOptions },
    Begin,
    RestartPolling,
    Connect { tag: TagId },
    Invalidate { message: Option<String> },
}

#[derive(Debug)]
struct MockState {
    available: bool,
    calls: Vec<ReaderCall>,
    sink: Option<EventSink>,
    sessions_opened: u64,
    next_tag_id: u64,
    begin_failures: VecDeque<HardwareError>,
    restart_failures: VecDeque<HardwareError>,
    connect_failures: VecDeque<HardwareError>,
}

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock tag reader for testing and development.
///
/// # Examples
///
/// ```
/// use tagreader_core::PollingOptions;
/// use tagreader_hardware::event::{EventSink, Generation, SessionEventKind};
/// use tagreader_hardware::mock::MockReader;
/// use tagreader_hardware::traits::{ReaderSession, TagReader};
/// use tagreader_hardware::TagTechnology;
/// use tokio::sync::mpsc;
///
/// #[tokio::main]
/// async fn main() -> tagreader_hardware::Result<()> {
///     let (mut reader, handle) = MockReader::new();
///     let (tx, mut rx) = mpsc::channel(8);
///
///     let mut session = reader
///         .open_session(PollingOptions::all(), EventSink::new(Generation::new(1), tx))
///         .await?;
///     session.begin().await?;
///
///     // Put a tag in the field
///     handle.detect(vec![TagTechnology::iso7816(vec![0x04, 0x9F])]).await?;
///
///     let event = rx.recv().await.unwrap();
///     assert!(matches!(event.kind, SessionEventKind::TagsDetected(_)));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockReader {
    name: String,
    state: SharedState,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// drives the radio side of the reader.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock NFC Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockReaderHandle) {
        let state = Arc::new(Mutex::new(MockState {
            available: true,
            calls: Vec::new(),
            sink: None,
            sessions_opened: 0,
            next_tag_id: 1,
            begin_failures: VecDeque::new(),
            restart_failures: VecDeque::new(),
            connect_failures: VecDeque::new(),
        }));

        let reader = Self {
            name: name.clone(),
            state: Arc::clone(&state),
        };

        (reader, MockReaderHandle { name, state })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl TagReader for MockReader {
    type Session = MockSession;

    fn is_reading_available(&self) -> bool {
        lock(&self.state).available
    }

    async fn open_session(
        &mut self,
        polling: PollingOptions,
        events: EventSink,
    ) -> Result<MockSession> {
        let mut state = lock(&self.state);
        state.calls.push(ReaderCall::OpenSession { polling });

        if !state.available {
            return Err(HardwareError::unavailable(format!(
                "{} has no reading capability",
                self.name
            )));
        }

        let generation = events.generation();
        state.sink = Some(events);
        state.sessions_opened += 1;
        debug!("{} opened session {} polling {}", self.name, generation, polling);

        Ok(MockSession {
            generation,
            state: Arc::clone(&self.state),
            connected: false,
            invalidated: false,
        })
    }
}

/// Session opened on a [`MockReader`].
#[derive(Debug)]
pub struct MockSession {
    generation: Generation,
    state: SharedState,
    connected: bool,
    invalidated: bool,
}

impl MockSession {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn ensure_active(&self) -> Result<()> {
        if self.invalidated {
            return Err(HardwareError::SessionInactive);
        }
        Ok(())
    }
}

impl ReaderSession for MockSession {
    async fn begin(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(ReaderCall::Begin);
        self.ensure_active()?;

        match state.begin_failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn restart_polling(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(ReaderCall::RestartPolling);
        self.ensure_active()?;

        match state.restart_failures.pop_front() {
            Some(error) => Err(error),
            None => {
                self.connected = false;
                Ok(())
            }
        }
    }

    async fn connect(&mut self, tag: &Tag) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(ReaderCall::Connect { tag: tag.id });
        self.ensure_active()?;

        match state.connect_failures.pop_front() {
            Some(error) => Err(error),
            None => {
                self.connected = true;
                Ok(())
            }
        }
    }

    async fn invalidate(&mut self, message: Option<&str>) {
        let mut state = lock(&self.state);
        state.calls.push(ReaderCall::Invalidate {
            message: message.map(str::to_string),
        });

        if self.invalidated {
            return;
        }
        self.invalidated = true;

        // Like a platform reader, ending the session is reported back
        // through the event sink.
        let sink = match state.sink.take() {
            Some(sink) if sink.generation() == self.generation => sink,
            other => {
                state.sink = other;
                return;
            }
        };
        drop(state);

        let cause = if self.connected {
            InvalidationError::FirstTagRead
        } else {
            InvalidationError::UserCanceled
        };
        if let Err(e) = sink.try_invalidated(cause) {
            debug!("Invalidation of session {} not reported: {}", self.generation, e);
        }
    }
}

/// Handle for driving a mock reader.
///
/// The handle plays the role of the radio: it reports activation,
/// detections and invalidations for the currently open session, and
/// inspects the calls the controller made.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    name: String,
    state: SharedState,
}

impl MockReaderHandle {
    /// Set whether the reader reports reading capability.
    pub fn set_available(&self, available: bool) {
        lock(&self.state).available = available;
    }

    /// Check if a session is currently open.
    pub fn is_session_open(&self) -> bool {
        lock(&self.state).sink.is_some()
    }

    /// Event sink of the currently open session.
    ///
    /// Holding on to a sink past the end of its session allows simulating
    /// late events from the reader.
    pub fn current_sink(&self) -> Option<EventSink> {
        lock(&self.state).sink.clone()
    }

    /// Report that the open session became active.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is open or the controller is gone.
    pub async fn activate(&self) -> Result<()> {
        self.sink()?.session_active().await
    }

    /// Put tags in the field and report a detection, in the given order.
    ///
    /// Returns the tags as reported, with their reader assigned handles.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is open or the controller is gone.
    pub async fn detect(&self, technologies: Vec<TagTechnology>) -> Result<Vec<Tag>> {
        let sink = self.sink()?;
        let tags: Vec<Tag> = {
            let mut state = lock(&self.state);
            technologies
                .into_iter()
                .map(|technology| {
                    let id = TagId::new(state.next_tag_id);
                    state.next_tag_id += 1;
                    Tag::new(id, technology)
                })
                .collect()
        };

        sink.tags_detected(tags.clone()).await?;
        Ok(tags)
    }

    /// Report a detection with no tags.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is open or the controller is gone.
    pub async fn detect_nothing(&self) -> Result<()> {
        self.sink()?.tags_detected(Vec::new()).await
    }

    /// Invalidate the open session from the reader side.
    ///
    /// # Errors
    ///
    /// Returns an error if no session is open or the controller is gone.
    pub async fn invalidate(&self, cause: InvalidationError) -> Result<()> {
        let sink = lock(&self.state)
            .sink
            .take()
            .ok_or(HardwareError::SessionInactive)?;
        sink.invalidated(cause).await
    }

    /// Make the next `begin` call fail.
    pub fn fail_next_begin(&self, error: HardwareError) {
        lock(&self.state).begin_failures.push_back(error);
    }

    /// Make the next `restart_polling` call fail.
    pub fn fail_next_restart(&self, error: HardwareError) {
        lock(&self.state).restart_failures.push_back(error);
    }

    /// Make the next `connect` call fail.
    pub fn fail_next_connect(&self, error: HardwareError) {
        lock(&self.state).connect_failures.push_back(error);
    }

    /// All calls made into the reader so far.
    pub fn calls(&self) -> Vec<ReaderCall> {
        lock(&self.state).calls.clone()
    }

    /// Number of polling restarts requested so far.
    pub fn restart_count(&self) -> usize {
        self.count(|call| matches!(call, ReaderCall::RestartPolling))
    }

    /// Tags the controller connected to, in call order.
    pub fn connected_tags(&self) -> Vec<TagId> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                ReaderCall::Connect { tag } => Some(*tag),
                _ => None,
            })
            .collect()
    }

    /// Messages passed to `invalidate`, in call order.
    pub fn invalidations(&self) -> Vec<Option<String>> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                ReaderCall::Invalidate { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of sessions opened so far.
    pub fn sessions_opened(&self) -> u64 {
        lock(&self.state).sessions_opened
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn count(&self, predicate: impl Fn(&ReaderCall) -> bool) -> usize {
        lock(&self.state).calls.iter().filter(|c| predicate(c)).count()
    }

    fn sink(&self) -> Result<EventSink> {
        self.current_sink().ok_or(HardwareError::SessionInactive)
    }
}
