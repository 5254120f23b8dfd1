use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::SliderError;

pub type SliderResult = Result<(), SliderError>;

/// Resolving half of an operation; consumed when the operation finishes.
///
/// Dropping it unresolved makes the waiting side observe
/// [`SliderError::Disposed`].
#[derive(Debug)]
pub struct Completion {
    tx: Sender<SliderResult>,
}

/// Waiting half of an operation started on a slider.
#[derive(Debug)]
pub struct PendingResult {
    rx: Receiver<SliderResult>,
}

pub fn completion_pair() -> (Completion, PendingResult) {
    let (tx, rx) = bounded(1);
    (Completion { tx }, PendingResult { rx })
}

impl Completion {
    pub fn resolve(self, result: SliderResult) {
        // the caller may have stopped waiting
        let _ = self.tx.send(result);
    }
}

impl PendingResult {
    /// A handle that is already resolved.
    pub fn ready(result: SliderResult) -> Self {
        let (completion, pending) = completion_pair();
        completion.resolve(result);
        pending
    }

    /// Blocks until the operation completes.
    pub fn wait(self) -> SliderResult {
        self.rx.recv().unwrap_or(Err(SliderError::Disposed))
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<SliderResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(SliderError::Disposed)),
        }
    }

    /// Non-blocking check; `None` while the operation is still pending.
    pub fn try_result(&self) -> Option<SliderResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SliderError::Disposed)),
        }
    }
}
