//! Backend selection with ordered fallback.
//!
//! Backends are tried in the configured preference order; an unavailable
//! backend is skipped via its cheap `is_available` probe and a failing one
//! is logged and skipped. A forced backend bypasses fallback entirely: its
//! errors surface to the caller instead of triggering the next candidate.

use image::DynamicImage;
use log::{debug, warn};

use crate::config::RecognitionConfig;
use crate::error::RecognitionError;
use crate::recognition::{
    RawRecognition, RecognitionBackend, StubBackend, TesseractBackend, VlmBackend,
};

/// A successful recognition together with the backend that produced it.
pub struct SelectedRecognition {
    pub recognition: RawRecognition,
    pub backend: String,
}

pub struct BackendSelector {
    backends: Vec<Box<dyn RecognitionBackend>>,
    forced: Option<String>,
}

impl BackendSelector {
    pub fn new(backends: Vec<Box<dyn RecognitionBackend>>, forced: Option<String>) -> Self {
        Self { backends, forced }
    }

    /// Builds the candidate list in preference order. Unknown names have
    /// already been rejected by config validation.
    pub fn from_config(config: &RecognitionConfig) -> Self {
        let backends = config
            .preference
            .iter()
            .filter_map(|name| -> Option<Box<dyn RecognitionBackend>> {
                match name.as_str() {
                    "vlm" => Some(Box::new(VlmBackend::new(
                        &config.model_dir,
                        config.model_repo.clone(),
                    ))),
                    "tesseract" => Some(Box::new(TesseractBackend::new(&config.languages))),
                    "stub" => Some(Box::new(StubBackend::new())),
                    other => {
                        warn!("Ignoring unknown backend in preference list: {}", other);
                        None
                    }
                }
            })
            .collect();

        Self {
            backends,
            forced: config.forced_backend.clone(),
        }
    }

    pub fn recognize(
        &self,
        image: &DynamicImage,
    ) -> Result<SelectedRecognition, RecognitionError> {
        if let Some(forced) = &self.forced {
            return self.recognize_forced(forced, image);
        }

        let mut attempted = Vec::new();
        for backend in &self.backends {
            if !backend.is_available() {
                debug!("Backend {} unavailable, skipping", backend.name());
                continue;
            }
            attempted.push(backend.name());
            match backend.recognize(image) {
                Ok(recognition) => {
                    debug!(
                        "Backend {} recognized {} lines (confidence {:.2})",
                        backend.name(),
                        recognition.lines.len(),
                        recognition.confidence
                    );
                    return Ok(SelectedRecognition {
                        recognition,
                        backend: backend.name().to_string(),
                    });
                }
                Err(e) => {
                    warn!("Backend {} failed, trying next: {}", backend.name(), e);
                }
            }
        }

        Err(RecognitionError::Exhausted(format!(
            "no backend produced a result (attempted: {})",
            if attempted.is_empty() {
                "none available".to_string()
            } else {
                attempted.join(", ")
            }
        )))
    }

    fn recognize_forced(
        &self,
        forced: &str,
        image: &DynamicImage,
    ) -> Result<SelectedRecognition, RecognitionError> {
        let backend = self
            .backends
            .iter()
            .find(|b| b.name() == forced)
            .ok_or_else(|| {
                RecognitionError::Unavailable(format!("{} (not in preference list)", forced))
            })?;

        if !backend.is_available() {
            return Err(RecognitionError::Unavailable(forced.to_string()));
        }

        let recognition = backend.recognize(image)?;
        Ok(SelectedRecognition {
            recognition,
            backend: forced.to_string(),
        })
    }
}
