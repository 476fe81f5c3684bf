//! Reading session controller.
//!
//! The controller runs as a single task that owns the reader, the active
//! session and its completion. Callers talk to it through commands; the
//! reader reports through generation-stamped events. Both arrive on channels
//! drained by the same loop, so session state is never touched concurrently.
//!
//! ```text
//! ┌──────────────────┐  Command (mpsc)   ┌──────────────────┐
//! │ SessionController│──────────────────►│                  │  open/begin/connect
//! │ (caller handle)  │                   │  Session task    │─────────────────────► Reader
//! └──────────────────┘                   │                  │
//!          ▲                             │                  │◄──────────────────── EventSink
//!          └──── completion callback ────│                  │  SessionEvent (mpsc)
//!                                        └──────────────────┘
//! ```
//!
//! # Session lifecycle
//!
//! 1. `read_tag` opens a session and starts polling
//! 2. An empty detection restarts polling after a short delay
//! 3. The first detected tag is connected to
//! 4. Its identifier becomes the success message, or `NotSupported`
//! 5. The session is closed and the completion receives the result
//!
//! Reader-side invalidations end the session at any point. The operator
//! closing the sheet and the reader closing after a successful read are
//! not failures and produce no result unless cancellation reporting is on.
//!
//! # Examples
//!
//! ```
//! use tagreader_hardware::{AnyTagReader, TagTechnology};
//! use tagreader_hardware::mock::MockReader;
//! use tagreader_session::{SessionConfig, SessionController};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (reader, handle) = MockReader::new();
//!     let controller =
//!         SessionController::spawn(AnyTagReader::Mock(reader), SessionConfig::default()).unwrap();
//!
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     controller
//!         .read_tag(move |result| {
//!             let _ = tx.send(result);
//!         })
//!         .await;
//!
//!     handle
//!         .detect(vec![TagTechnology::iso7816(vec![0x04, 0x9F, 0xAB])])
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(rx.await.unwrap(), Ok("Tag with identifier 049fab".to_string()));
//!     controller.shutdown().await.unwrap();
//! }
//! ```

use tagreader_core::constants::SUCCESS_MESSAGE_PREFIX;
use tagreader_core::{ReadResult, ReaderError};
use tagreader_hardware::{
    AnyReaderSession, AnyTagReader, EventSink, Generation, HardwareError, InvalidationError,
    ReaderSession, SessionEvent, SessionEventKind, Tag, TagReader,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::completion::Completion;
use crate::config::SessionConfig;
use crate::error::{ControllerError, Result};
use crate::state::{PhaseTracker, PhaseTransition, SessionPhase};

/// Request sent from a [`SessionController`] handle to the session task.
#[derive(Debug)]
enum Command {
    ReadTag {
        completion: Completion,
        accepted: oneshot::Sender<()>,
    },
    Cancel {
        reply: oneshot::Sender<bool>,
    },
    Phase {
        reply: oneshot::Sender<SessionPhase>,
    },
    History {
        reply: oneshot::Sender<Vec<PhaseTransition>>,
    },
    /// Posted by the repoll timer of the given session.
    Repoll {
        generation: Generation,
    },
    Shutdown,
}

/// Session currently owned by the task.
#[derive(Debug)]
struct ActiveSession {
    generation: Generation,
    handle: AnyReaderSession,
    completion: Completion,
}

/// Handle to a running session controller.
///
/// At most one reading session is active at a time. Dropping every handle
/// stops the controller task and closes any active session silently.
#[derive(Debug)]
pub struct SessionController {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl SessionController {
    /// Spawn the controller task on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Config` if the configuration is invalid.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(reader: AnyTagReader, config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let (commands_tx, commands_rx) = mpsc::channel(config.channel_capacity);
        let (events_tx, events_rx) = mpsc::channel(config.channel_capacity);

        let actor = SessionActor {
            reader,
            tracker: PhaseTracker::with_history_limit(config.history_size),
            config,
            generation: Generation::new(0),
            session: None,
            commands: commands_tx.downgrade(),
            commands_rx,
            events_tx,
            events_rx,
        };

        info!("Starting tag reading session controller");
        let task = tokio::spawn(actor.run());

        Ok(Self {
            commands: commands_tx,
            task,
        })
    }

    /// Start a reading session.
    ///
    /// `completion` is called at most once with the terminal result of the
    /// session. Failures known up front (reading unavailable, a session
    /// already active, the session failing to open) are delivered before
    /// this method returns. A session that ends by operator dismissal may
    /// never call it.
    pub async fn read_tag<F>(&self, completion: F)
    where
        F: FnOnce(ReadResult) + Send + 'static,
    {
        let (accepted_tx, accepted_rx) = oneshot::channel();
        let command = Command::ReadTag {
            completion: Completion::new(completion),
            accepted: accepted_tx,
        };

        if let Err(mpsc::error::SendError(command)) = self.commands.send(command).await {
            warn!("Read requested after the session controller stopped");
            if let Command::ReadTag { completion, .. } = command {
                completion.deliver(Err(ReaderError::Generic));
            }
            return;
        }

        // The task drops the ack only when it stops; the completion has
        // been handled either way.
        let _ = accepted_rx.await;
    }

    /// Start a reading session and wait for its result.
    ///
    /// Returns `None` if the session ended without a result.
    pub async fn read(&self) -> Option<ReadResult> {
        let (tx, rx) = oneshot::channel();
        self.read_tag(move |result| {
            let _ = tx.send(result);
        })
        .await;
        rx.await.ok()
    }

    /// Close the active session, if any.
    ///
    /// Returns whether a session was active. The completion receives
    /// `Cancelled` only when cancellation reporting is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Stopped` if the controller task is gone.
    pub async fn cancel(&self) -> Result<bool> {
        self.request(|reply| Command::Cancel { reply }).await
    }

    /// Current session phase.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Stopped` if the controller task is gone.
    pub async fn phase(&self) -> Result<SessionPhase> {
        self.request(|reply| Command::Phase { reply }).await
    }

    /// Recent phase transitions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Stopped` if the controller task is gone.
    pub async fn history(&self) -> Result<Vec<PhaseTransition>> {
        self.request(|reply| Command::History { reply }).await
    }

    /// Stop the controller task, closing any active session first.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::TaskFailed` if the task panicked.
    pub async fn shutdown(self) -> Result<()> {
        if self.commands.send(Command::Shutdown).await.is_err() {
            debug!("Session controller already stopped");
        }
        drop(self.commands);

        self.task
            .await
            .map_err(|e| ControllerError::TaskFailed(e.to_string()))
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(make(reply_tx))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        reply_rx.await.map_err(|_| ControllerError::Stopped)
    }
}

/// State owned by the controller task.
struct SessionActor {
    reader: AnyTagReader,
    config: SessionConfig,
    tracker: PhaseTracker,

    /// Generation of the most recently opened session.
    generation: Generation,

    session: Option<ActiveSession>,

    /// Used by repoll timers; does not keep the task alive.
    commands: mpsc::WeakSender<Command>,
    commands_rx: mpsc::Receiver<Command>,

    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: mpsc::Receiver<SessionEvent>,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                }
                command = self.commands_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
            }
        }

        if self.session.is_some() {
            debug!("Closing active session on shutdown");
            self.cancel().await;
        }
        info!("Session controller stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::ReadTag {
                completion,
                accepted,
            } => {
                self.start(completion).await;
                let _ = accepted.send(());
            }
            Command::Cancel { reply } => {
                let was_active = self.cancel().await;
                let _ = reply.send(was_active);
            }
            Command::Phase { reply } => {
                let _ = reply.send(self.tracker.current());
            }
            Command::History { reply } => {
                let _ = reply.send(self.tracker.history().iter().cloned().collect());
            }
            Command::Repoll { generation } => self.repoll(generation).await,
            Command::Shutdown => {}
        }
    }

    async fn start(&mut self, completion: Completion) {
        if self.session.is_some() {
            warn!("Read requested while a session is active");
            completion.deliver(Err(ReaderError::Busy));
            return;
        }

        if !self.reader.is_reading_available() {
            info!("Tag reading is not available on this device");
            completion.deliver(Err(ReaderError::Unavailable));
            return;
        }

        self.generation = self.generation.next();
        let generation = self.generation;
        let sink = EventSink::new(generation, self.events_tx.clone());

        let mut handle = match self.reader.open_session(self.config.polling, sink).await {
            Ok(handle) => handle,
            Err(HardwareError::Unavailable { message }) => {
                info!("Reader refused session {}: {}", generation, message);
                completion.deliver(Err(ReaderError::Unavailable));
                return;
            }
            Err(e) => {
                warn!("Failed to open session {}: {}", generation, e);
                completion.deliver(Err(ReaderError::invalidated(e.to_string())));
                return;
            }
        };

        debug!("Opened session {} polling {}", generation, self.config.polling);
        self.enter(SessionPhase::Polling);

        let begun = handle.begin().await;
        let active = ActiveSession {
            generation,
            handle,
            completion,
        };

        match begun {
            Ok(()) => self.session = Some(active),
            Err(e) => {
                warn!("Failed to start polling for session {}: {}", generation, e);
                self.finish(active, Some(Err(ReaderError::invalidated(e.to_string()))), None)
                    .await;
            }
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        let current = self.session.as_ref().map(|active| active.generation);
        if current != Some(event.generation) {
            debug!(
                "Ignoring {:?} from stale session {}",
                event.kind, event.generation
            );
            return;
        }

        match event.kind {
            SessionEventKind::Active => {
                debug!("Session {} became active", event.generation);
            }
            SessionEventKind::TagsDetected(tags) => self.on_tags_detected(tags).await,
            SessionEventKind::Invalidated(cause) => self.on_invalidated(cause),
        }
    }

    async fn on_tags_detected(&mut self, tags: Vec<Tag>) {
        if self.tracker.current() != SessionPhase::Polling {
            debug!(
                "Ignoring detection while {}",
                self.tracker.current()
            );
            return;
        }

        let Some(tag) = tags.into_iter().next() else {
            trace!("No tags detected, restarting polling");
            self.enter(SessionPhase::Polling);
            self.schedule_repoll();
            return;
        };

        let Some(mut active) = self.session.take() else {
            return;
        };

        self.enter(SessionPhase::Connecting);
        if let Err(e) = active.handle.connect(&tag).await {
            warn!("Failed to connect to {}: {}", tag.id, e);
            self.finish(active, Some(Err(ReaderError::invalidated(e.to_string()))), None)
                .await;
            return;
        }

        self.enter(SessionPhase::Dispatching);
        info!("Connected to {} tag {}", tag.technology.name(), tag.id);

        let result = match tag.technology.identifier() {
            Some(identifier) => Ok(format!("{}{}", SUCCESS_MESSAGE_PREFIX, identifier.to_hex())),
            None => {
                warn!("Unsupported tag technology: {:?}", tag.technology);
                Err(ReaderError::NotSupported)
            }
        };

        self.finish(active, Some(result), None).await;
    }

    fn on_invalidated(&mut self, cause: InvalidationError) {
        let Some(active) = self.session.take() else {
            return;
        };

        if cause.is_benign() {
            if cause.is_user_cancellation() && self.config.report_cancellation {
                info!("Session {} cancelled by user", active.generation);
                self.enter(SessionPhase::Done);
                active.completion.deliver(Err(ReaderError::Cancelled));
            } else {
                debug!("Session {} ended: {}", active.generation, cause);
            }
        } else {
            warn!("Session {} invalidated: {}", active.generation, cause);
            self.enter(SessionPhase::Done);
            active
                .completion
                .deliver(Err(ReaderError::invalidated(cause.to_string())));
        }

        // The reader already ended the session; no close call is made.
        self.tracker.reset();
    }

    async fn repoll(&mut self, generation: Generation) {
        if self.tracker.current() != SessionPhase::Polling {
            return;
        }

        let restarted = match self.session.as_mut() {
            Some(active) if active.generation == generation => {
                active.handle.restart_polling().await
            }
            _ => {
                trace!("Dropping repoll for stale session {}", generation);
                return;
            }
        };

        if let Err(e) = restarted {
            warn!("Failed to restart polling for session {}: {}", generation, e);
            if let Some(active) = self.session.take() {
                self.finish(active, Some(Err(ReaderError::invalidated(e.to_string()))), None)
                    .await;
            }
        }
    }

    /// Close the active session. Returns whether one was active.
    async fn cancel(&mut self) -> bool {
        let Some(active) = self.session.take() else {
            return false;
        };

        info!("Cancelling session {}", active.generation);
        let result = self
            .config
            .report_cancellation
            .then_some(Err(ReaderError::Cancelled));
        self.finish(active, result, None).await;
        true
    }

    /// Deliver `result` if given, then close the reader session.
    ///
    /// Without a result the completion is dropped undelivered.
    async fn finish(
        &mut self,
        mut active: ActiveSession,
        result: Option<ReadResult>,
        message: Option<&str>,
    ) {
        if let Some(result) = result {
            self.enter(SessionPhase::Done);
            active.completion.deliver(result);
        }

        active.handle.invalidate(message).await;
        self.tracker.reset();
    }

    fn schedule_repoll(&self) {
        let commands = self.commands.clone();
        let generation = self.generation;
        let delay = self.config.repoll_delay();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(commands) = commands.upgrade()
                && commands.send(Command::Repoll { generation }).await.is_err()
            {
                trace!("Controller stopped before repoll of session {}", generation);
            }
        });
    }

    fn enter(&mut self, phase: SessionPhase) {
        if let Err(e) = self.tracker.transition_to(phase) {
            warn!("{}", e);
        }
    }
}
