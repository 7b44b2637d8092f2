//! In-memory job store.
//!
//! Holds one record per submitted job behind an `RwLock`; readers get
//! cloned snapshots, never live references. Completed and failed records
//! are terminal: later writes against them are ignored with a warning, so
//! a snapshot taken after completion can never be contradicted.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::broadcast::job_progress::JobStatus;
use crate::task::Task;
use crate::worker::job::{Job, JobResult};

/// Status-read snapshot of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJob {
    /// Unique job identifier.
    pub job_id: String,
    /// Original filename being processed.
    pub filename: String,
    /// Current status.
    pub status: JobStatus,
    /// When the job was submitted.
    pub created_at: DateTime<Utc>,
    /// When a worker picked the job up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock processing time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Aggregate confidence (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Backend that produced the result (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Extracted tasks in reading order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    /// Short error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Full error chain for operators, kept out of serialized output.
    #[serde(skip)]
    pub error_trace: Option<String>,
}

impl StoredJob {
    fn pending(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            filename: job.filename.clone(),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_seconds: None,
            confidence: None,
            backend: None,
            tasks: vec![],
            error: None,
            error_trace: None,
        }
    }
}

/// Anything a worker can hand finished results to.
pub trait ResultSink: Send + Sync {
    fn write_result(&self, result: &JobResult);
}

#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, StoredJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly submitted job.
    pub fn insert_pending(&self, job: &Job) {
        let mut jobs = self.write_jobs();
        jobs.insert(job.id.clone(), StoredJob::pending(job));
    }

    /// Transitions a job to processing when a worker dequeues it.
    pub fn mark_processing(&self, job_id: &str) {
        let mut jobs = self.write_jobs();
        match jobs.get_mut(job_id) {
            Some(stored) if stored.status.is_terminal() => {
                warn!("Ignoring processing transition for terminal job {}", job_id);
            }
            Some(stored) => {
                stored.status = JobStatus::Processing;
                stored.started_at = Some(Utc::now());
            }
            None => warn!("mark_processing: unknown job {}", job_id),
        }
    }

    /// Applies a terminal result. A second result for the same job is
    /// dropped; terminal records never change.
    pub fn apply_result(&self, result: &JobResult) {
        let mut jobs = self.write_jobs();
        let Some(stored) = jobs.get_mut(&result.job_id) else {
            warn!("apply_result: unknown job {}", result.job_id);
            return;
        };
        if stored.status.is_terminal() {
            warn!("Ignoring duplicate result for terminal job {}", result.job_id);
            return;
        }

        let completed_at = Utc::now();
        let since = stored.started_at.unwrap_or(stored.created_at);
        stored.completed_at = Some(completed_at);
        stored.duration_seconds = Some(
            (completed_at - since).num_milliseconds() as f64 / 1000.0,
        );

        if result.success {
            stored.status = JobStatus::Completed;
            stored.tasks = result.tasks.clone();
            stored.confidence = Some(result.confidence);
            stored.backend = result.backend.clone();
        } else {
            stored.status = JobStatus::Failed;
            stored.error = result.error.clone();
            stored.error_trace = result.error_trace.clone();
        }
    }

    /// Snapshot of one job.
    pub fn get(&self, job_id: &str) -> Option<StoredJob> {
        self.read_jobs().get(job_id).cloned()
    }

    /// Snapshot of every job, newest first.
    pub fn list(&self) -> Vec<StoredJob> {
        let mut jobs: Vec<StoredJob> = self.read_jobs().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    /// Removes terminal jobs that finished more than `max_age` ago.
    /// Returns the number of removed records.
    pub fn sweep_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut jobs = self.write_jobs();
        let before = jobs.len();
        jobs.retain(|_, stored| {
            !(stored.status.is_terminal()
                && stored.completed_at.map(|t| t < cutoff).unwrap_or(false))
        });
        before - jobs.len()
    }

    fn read_jobs(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredJob>> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_jobs(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredJob>> {
        self.jobs.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResultSink for JobStore {
    fn write_result(&self, result: &JobResult) {
        self.apply_result(result);
    }
}
