//! Placeholder for the vision-language backend when the binary is built
//! without the "vlm" feature. Keeps the selector code identical across
//! builds: the backend simply reports itself unavailable.

use std::path::PathBuf;

use image::DynamicImage;

use crate::error::RecognitionError;
use crate::recognition::{RawRecognition, RecognitionBackend};

pub struct VlmBackend {
    _model_dir: PathBuf,
    _model_repo: Option<String>,
}

impl VlmBackend {
    pub fn new(model_dir: impl Into<PathBuf>, model_repo: Option<String>) -> Self {
        Self {
            _model_dir: model_dir.into(),
            _model_repo: model_repo,
        }
    }
}

impl RecognitionBackend for VlmBackend {
    fn name(&self) -> &'static str {
        "vlm"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<RawRecognition, RecognitionError> {
        Err(RecognitionError::Unavailable(
            "vlm (rebuild with --features vlm)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_available() {
        let backend = VlmBackend::new("./weights", None);
        assert!(!backend.is_available());
        assert_eq!(backend.name(), "vlm");
    }

    #[test]
    fn test_recognize_reports_unavailable() {
        let backend = VlmBackend::new("./weights", None);
        let image = DynamicImage::new_rgb8(4, 4);
        match backend.recognize(&image) {
            Err(RecognitionError::Unavailable(_)) => {}
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
