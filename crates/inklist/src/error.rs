use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InklistError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Unknown recognition backend '{name}'")]
    UnknownBackend { name: String },
}

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Backend '{0}' is not available")]
    Unavailable(String),

    #[error("Engine initialization failed: {0}")]
    Init(String),

    #[error("Recognition failed: {0}")]
    Failed(String),

    #[error("All configured backends were unavailable or failed: {0}")]
    Exhausted(String),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,

    #[error("Job rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, InklistError>;
