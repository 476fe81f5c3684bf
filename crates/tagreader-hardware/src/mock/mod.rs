//! Mock reader implementation for testing and development.
//!
//! This module provides a simulated tag reader that can be controlled
//! programmatically without requiring physical hardware.

pub mod reader;

// Re-export commonly used types
pub use reader::{MockReader, MockReaderHandle, MockSession, ReaderCall};
