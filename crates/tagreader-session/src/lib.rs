//! Tag reading session controller.
//!
//! This crate drives one tag reading session at a time against a
//! [`TagReader`](tagreader_hardware::TagReader): it opens the session,
//! restarts polling on empty detections, connects to the first detected tag
//! and reports the tag identifier, or the reason reading failed, to the
//! caller's completion exactly once.

mod completion;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::{ControllerError, Result};
pub use state::{PhaseTracker, PhaseTransition, SessionPhase};
