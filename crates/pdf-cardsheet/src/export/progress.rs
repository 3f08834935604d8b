//! Progress reporting and cancellation for exports

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

/// Events delivered to a channel-based progress observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    /// Percentage of page jobs rendered, 0 to 100
    Progress(u8),
    Finished { pages: usize },
    Cancelled,
    Failed { message: String },
}

/// One-way progress notifications from an export.
///
/// Implementations must return quickly: the export never waits on the
/// observer.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, percent: u8);

    fn finished(&self, _pages: usize) {}

    fn cancelled(&self) {}

    fn failed(&self, _message: &str) {}
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&self, _percent: u8) {}
}

/// Adapts a closure receiving percentages into a [`ProgressSink`]
pub struct ProgressFn<F>(pub F);

impl<F> ProgressSink for ProgressFn<F>
where
    F: Fn(u8) + Send + Sync,
{
    fn progress(&self, percent: u8) {
        (self.0)(percent)
    }
}

impl ProgressSink for mpsc::UnboundedSender<ExportEvent> {
    // A dropped receiver means nobody is watching; the export carries on.
    fn progress(&self, percent: u8) {
        let _ = self.send(ExportEvent::Progress(percent));
    }

    fn finished(&self, pages: usize) {
        let _ = self.send(ExportEvent::Finished { pages });
    }

    fn cancelled(&self) {
        let _ = self.send(ExportEvent::Cancelled);
    }

    fn failed(&self, message: &str) {
        let _ = self.send(ExportEvent::Failed {
            message: message.to_string(),
        });
    }
}

/// `floor(completed / total * 100)`
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (completed.min(total) * 100 / total) as u8
}

/// Shared flag to abort a running export between page jobs
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
