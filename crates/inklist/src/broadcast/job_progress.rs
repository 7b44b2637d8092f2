//! Job progress broadcaster for real-time job status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::task::Task;

/// Phase of job processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Queued,
    Decoding,
    Recognizing,
    Segmenting,
    Extracting,
    Scoring,
    Completed,
    Failed,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Queued => write!(f, "Queued"),
            JobPhase::Decoding => write!(f, "Decoding image"),
            JobPhase::Recognizing => write!(f, "Recognizing text"),
            JobPhase::Segmenting => write!(f, "Segmenting tasks"),
            JobPhase::Extracting => write!(f, "Extracting fields"),
            JobPhase::Scoring => write!(f, "Scoring confidence"),
            JobPhase::Completed => write!(f, "Completed"),
            JobPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Status of a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Progress event for a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Unique job identifier.
    pub job_id: String,
    /// Original filename being processed.
    pub filename: String,
    /// Current phase of processing.
    pub phase: JobPhase,
    /// Overall job status.
    pub status: JobStatus,
    /// Human-readable message describing current activity.
    pub message: String,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
    /// Extracted tasks (set on completion).
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Aggregate confidence (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Backend that produced the result (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobProgressEvent {
    /// Creates a new progress event.
    pub fn new(job_id: &str, filename: &str, phase: JobPhase, message: &str) -> Self {
        let status = match phase {
            JobPhase::Queued => JobStatus::Pending,
            JobPhase::Completed => JobStatus::Completed,
            JobPhase::Failed => JobStatus::Failed,
            _ => JobStatus::Processing,
        };

        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            phase,
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
            tasks: vec![],
            confidence: None,
            backend: None,
            error: None,
        }
    }

    /// Creates a completion event.
    pub fn completed(
        job_id: &str,
        filename: &str,
        tasks: &[Task],
        confidence: f32,
        backend: &str,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            phase: JobPhase::Completed,
            status: JobStatus::Completed,
            message: format!("Extracted {} task(s)", tasks.len()),
            timestamp: Utc::now(),
            tasks: tasks.to_vec(),
            confidence: Some(confidence),
            backend: Some(backend.to_string()),
            error: None,
        }
    }

    /// Creates a failure event.
    pub fn failed(job_id: &str, filename: &str, error: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            phase: JobPhase::Failed,
            status: JobStatus::Failed,
            message: "Processing failed".to_string(),
            timestamp: Utc::now(),
            tasks: vec![],
            confidence: None,
            backend: None,
            error: Some(error.to_string()),
        }
    }
}

/// Broadcasts job progress events for streaming.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    /// Creates a new job progress broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: JobProgressEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }

    /// Creates a new job progress tracker for a processing job.
    pub fn start_job(&self, job_id: &str, filename: &str) -> JobProgressTracker {
        let tracker = JobProgressTracker::new(job_id, filename, Arc::clone(&self.sender));

        // Send initial queued event
        tracker.update_phase(JobPhase::Queued, "Job queued for processing");

        tracker
    }

    /// Gets the inner sender for creating trackers.
    pub fn sender(&self) -> Arc<broadcast::Sender<JobProgressEvent>> {
        Arc::clone(&self.sender)
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Tracks progress for a single job.
pub struct JobProgressTracker {
    job_id: String,
    filename: String,
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressTracker {
    /// Creates a new job progress tracker.
    pub fn new(
        job_id: &str,
        filename: &str,
        sender: Arc<broadcast::Sender<JobProgressEvent>>,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            filename: filename.to_string(),
            sender,
        }
    }

    /// Updates the current phase with a message.
    pub fn update_phase(&self, phase: JobPhase, message: &str) {
        let event = JobProgressEvent::new(&self.job_id, &self.filename, phase, message);
        let _ = self.sender.send(event);
    }

    /// Marks the job as completed with its extracted tasks.
    pub fn completed(&self, tasks: &[Task], confidence: f32, backend: &str) {
        let event =
            JobProgressEvent::completed(&self.job_id, &self.filename, tasks, confidence, backend);
        let _ = self.sender.send(event);
    }

    /// Marks the job as failed with an error message.
    pub fn failed(&self, error: &str) {
        let event = JobProgressEvent::failed(&self.job_id, &self.filename, error);
        let _ = self.sender.send(event);
    }
}
