pub mod broadcast;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod recognition;
pub mod sanitize;
pub mod score;
pub mod segment;
pub mod store;
pub mod task;
pub mod worker;

pub use broadcast::{JobPhase, JobProgressBroadcaster, JobProgressEvent, JobStatus};
pub use config::{load_config, Config, RecognitionConfig};
pub use error::{ConfigError, InklistError, RecognitionError, Result, WorkerError};
pub use extract::{DateLocale, ExtractedFields, FieldExtractor};
pub use pipeline::{Pipeline, PipelineConfig, PipelineContext};
pub use recognition::{BackendSelector, RecognitionBackend};
pub use score::ConfidenceScorer;
pub use segment::{LineGroup, TaskSegmenter};
pub use store::{JobStore, ResultSink, StoredJob};
pub use task::{BoundingBox, Priority, Task};
pub use worker::{Job, JobResult, WorkerPool};
