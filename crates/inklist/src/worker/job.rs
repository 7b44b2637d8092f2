use crate::task::Task;

/// A unit of work: one image to turn into a task list.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// Encoded image bytes as received (PNG, JPEG, etc.).
    pub image_data: Vec<u8>,
    /// Original filename, kept for progress events and logs.
    pub filename: String,
}

impl Job {
    pub fn new(image_data: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image_data,
            filename: filename.into(),
        }
    }

    /// Caller-supplied identifier, for callers that track jobs externally.
    pub fn with_id(id: impl Into<String>, image_data: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_data,
            filename: filename.into(),
        }
    }
}

#[derive(Debug)]
pub struct JobResult {
    pub job_id: String,
    pub filename: String,
    pub success: bool,
    pub tasks: Vec<Task>,
    /// Aggregate confidence for the whole job.
    pub confidence: f32,
    /// Backend that produced the result.
    pub backend: Option<String>,
    pub error: Option<String>,
    /// Full error chain for operators; never serialized to clients.
    pub error_trace: Option<String>,
}

impl JobResult {
    pub fn completed(job: &Job, tasks: Vec<Task>, confidence: f32, backend: String) -> Self {
        Self {
            job_id: job.id.clone(),
            filename: job.filename.clone(),
            success: true,
            tasks,
            confidence,
            backend: Some(backend),
            error: None,
            error_trace: None,
        }
    }

    pub fn failure(job: &Job, error: String, error_trace: String) -> Self {
        Self {
            job_id: job.id.clone(),
            filename: job.filename.clone(),
            success: false,
            tasks: vec![],
            confidence: 0.0,
            backend: None,
            error: Some(error),
            error_trace: Some(error_trace),
        }
    }
}
