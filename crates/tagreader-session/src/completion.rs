//! Single-delivery completion for a read request.

use std::fmt;

use tagreader_core::ReadResult;

type Callback = Box<dyn FnOnce(ReadResult) + Send + 'static>;

/// Caller continuation for one reading session.
///
/// Delivering consumes the completion, so a session can report at most one
/// result. Dropping it without delivering ends the session silently.
pub(crate) struct Completion {
    callback: Callback,
}

impl Completion {
    pub(crate) fn new<F>(callback: F) -> Self
    where
        F: FnOnce(ReadResult) + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    pub(crate) fn deliver(self, result: ReadResult) {
        (self.callback)(result);
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}
