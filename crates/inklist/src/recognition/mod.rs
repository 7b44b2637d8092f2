//! Pluggable recognition backends and the fallback selector.
//!
//! Each backend turns a decoded image into raw text lines with optional
//! geometry. The selector tries backends in configured preference order,
//! skipping unavailable ones and falling through on failure.

pub mod lazy;
pub mod selector;
pub mod stub;
pub mod tesseract;

#[cfg(feature = "vlm")]
pub mod vlm;

#[cfg(not(feature = "vlm"))]
pub mod vlm_stub;

#[cfg(not(feature = "vlm"))]
pub use vlm_stub as vlm;

use image::DynamicImage;

use crate::error::RecognitionError;
use crate::task::BoundingBox;

pub use lazy::LazyEngine;
pub use selector::{BackendSelector, SelectedRecognition};
pub use stub::StubBackend;
pub use tesseract::TesseractBackend;
pub use vlm::VlmBackend;

/// One recognized text line. Geometry and per-line confidence are optional;
/// not every backend produces them.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub text: String,
    pub bbox: Option<BoundingBox>,
    pub confidence: Option<f32>,
}

impl RawLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            confidence: None,
        }
    }

    pub fn with_geometry(text: impl Into<String>, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
            confidence: Some(confidence),
        }
    }
}

/// Raw output of one backend invocation: ordered lines plus an overall
/// confidence estimate for the whole image.
#[derive(Debug, Clone)]
pub struct RawRecognition {
    pub lines: Vec<RawLine>,
    pub confidence: f32,
}

/// One OCR technology. Implementations must be cheap to probe via
/// `is_available`; expensive state belongs behind a [`LazyEngine`].
pub trait RecognitionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap availability probe: dependency present, required resource
    /// reachable. Must not pay full initialization cost on every call.
    fn is_available(&self) -> bool;

    fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition, RecognitionError>;
}
