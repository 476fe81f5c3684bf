//! Common test utilities for session controller integration tests.
//!
//! Completions are recorded into an unbounded channel. A session that ends
//! silently drops its completion, which closes the channel, so
//! [`expect_no_result`] sees `None` instead of waiting for a timeout.

#![allow(dead_code)]

use std::time::Duration;

use tagreader_core::ReadResult;
use tagreader_hardware::AnyTagReader;
use tagreader_hardware::mock::{MockReader, MockReaderHandle};
use tagreader_session::{SessionConfig, SessionController};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Upper bound for anything the controller should do promptly.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(1);

/// Spawn a controller over a fresh mock reader.
pub fn spawn_controller(config: SessionConfig) -> (SessionController, MockReaderHandle) {
    let (reader, handle) = MockReader::new();
    let controller = SessionController::spawn(AnyTagReader::Mock(reader), config)
        .expect("valid test configuration");
    (controller, handle)
}

/// Completion that forwards its result into a channel.
pub fn recorder() -> (
    impl FnOnce(ReadResult) + Send + 'static,
    mpsc::UnboundedReceiver<ReadResult>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let completion = move |result: ReadResult| {
        tx.send(result).expect("test receiver alive");
    };
    (completion, rx)
}

/// Start a session and return its result receiver.
pub async fn start_read(controller: &SessionController) -> mpsc::UnboundedReceiver<ReadResult> {
    let (completion, rx) = recorder();
    controller.read_tag(completion).await;
    rx
}

/// Wait for the session result.
pub async fn expect_result(rx: &mut mpsc::UnboundedReceiver<ReadResult>) -> ReadResult {
    timeout(STEP_TIMEOUT, rx.recv())
        .await
        .expect("result timeout")
        .expect("session ended without a result")
}

/// Assert the session ended without delivering a result.
pub async fn expect_no_result(rx: &mut mpsc::UnboundedReceiver<ReadResult>) {
    let received = timeout(STEP_TIMEOUT, rx.recv())
        .await
        .expect("completion was neither delivered nor dropped");
    assert_eq!(received, None, "unexpected session result");
}

/// Poll `condition` until it holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(STEP_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
