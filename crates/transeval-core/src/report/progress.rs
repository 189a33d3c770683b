//! Progress events emitted by the batch runner after each record completes.
//! The console layer consumes them via a sink.

use std::sync::Arc;

/// One progress update: how many records are done and the total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. Implementations may throttle.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
