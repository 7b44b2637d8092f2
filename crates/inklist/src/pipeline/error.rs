use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Recognition failed: {0}")]
    Recognition(#[from] crate::error::RecognitionError),
}
