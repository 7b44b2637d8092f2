//! Real-time event streaming for job progress.

pub mod job_progress;

pub use job_progress::{
    JobPhase, JobProgressBroadcaster, JobProgressEvent, JobProgressTracker, JobStatus,
};
