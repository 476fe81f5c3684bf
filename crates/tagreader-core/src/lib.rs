//! Shared primitives for the tag reading session controller.
//!
//! This crate holds the failure taxonomy reported to callers of a reading
//! session, the identifier and polling types used by the hardware layer, and
//! the default tuning constants.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{ReadResult, ReaderError};
pub use types::{PollingOption, PollingOptions, TagIdentifier};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
