use std::sync::Arc;

use tokio::sync::broadcast;

use crate::broadcast::job_progress::{JobPhase, JobProgressEvent, JobProgressTracker};
use crate::task::Task;

/// Events emitted by the pipeline during processing.
pub enum ProgressEvent {
    Phase {
        phase: JobPhase,
        message: String,
    },
    Completed {
        tasks: Vec<Task>,
        confidence: f32,
        backend: String,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Wraps a JobProgressTracker to bridge pipeline events to the broadcast
/// channel.
pub struct BroadcastProgress {
    tracker: JobProgressTracker,
}

impl BroadcastProgress {
    pub fn new(
        job_id: &str,
        filename: &str,
        sender: Arc<broadcast::Sender<JobProgressEvent>>,
    ) -> Self {
        Self {
            tracker: JobProgressTracker::new(job_id, filename, sender),
        }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => {
                self.tracker.update_phase(phase, &message);
            }
            ProgressEvent::Completed {
                tasks,
                confidence,
                backend,
            } => {
                self.tracker.completed(&tasks, confidence, &backend);
            }
            ProgressEvent::Failed { error } => {
                self.tracker.failed(&error);
            }
        }
    }
}
