//! Classical OCR backend built on Tesseract via leptess.

use std::io::Cursor;

use image::DynamicImage;
use log::debug;

use crate::error::RecognitionError;
use crate::recognition::{LazyEngine, RawLine, RawRecognition, RecognitionBackend};

/// Marker for a successful Tesseract probe of the configured languages.
struct TessProbe;

pub struct TesseractBackend {
    languages: String,
    probe: LazyEngine<TessProbe>,
}

impl TesseractBackend {
    pub fn new(languages: &[String]) -> Self {
        let lang_str = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self {
            languages: lang_str,
            probe: LazyEngine::new(),
        }
    }

    /// Constructing a LepTess instance verifies the tessdata for the
    /// configured languages is installed. The probe result is cached so
    /// repeated availability checks stay cheap.
    fn ensure_probed(&self) -> Result<(), RecognitionError> {
        self.probe
            .get_or_try_init(|| {
                leptess::LepTess::new(None, &self.languages)
                    .map(|_| TessProbe)
                    .map_err(|e| RecognitionError::Init(format!("Tesseract: {}", e)))
            })
            .map(|_| ())
    }

    #[cfg(test)]
    pub fn reset_probe(&self) {
        self.probe.reset();
    }
}

impl RecognitionBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        self.ensure_probed().is_ok()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition, RecognitionError> {
        let _span = tracing::info_span!("recognition.tesseract").entered();

        self.ensure_probed()?;

        // LepTess is not Send, so an instance is created per invocation;
        // only the probe result is shared.
        let mut png_data = Vec::new();
        let mut cursor = Cursor::new(&mut png_data);
        image
            .write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| RecognitionError::Failed(format!("Failed to convert image: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &self.languages)
            .map_err(|e| RecognitionError::Init(format!("Tesseract: {}", e)))?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| RecognitionError::Failed(format!("Failed to set image: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| RecognitionError::Failed(format!("OCR failed: {}", e)))?;

        let confidence = (lt.mean_text_conf().clamp(0, 100) as f32) / 100.0;

        let lines: Vec<RawLine> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(RawLine::new)
            .collect();

        debug!(
            "Tesseract recognized {} lines (mean confidence {:.2})",
            lines.len(),
            confidence
        );

        Ok(RawRecognition { lines, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_joined() {
        let backend = TesseractBackend::new(&["eng".to_string(), "deu".to_string()]);
        assert_eq!(backend.languages, "eng+deu");
    }

    #[test]
    fn test_default_language() {
        let backend = TesseractBackend::new(&[]);
        assert_eq!(backend.languages, "eng");
    }

    #[test]
    fn test_name() {
        let backend = TesseractBackend::new(&[]);
        assert_eq!(backend.name(), "tesseract");
    }

    #[test]
    fn test_probe_reset() {
        let backend = TesseractBackend::new(&["eng".to_string()]);
        // Whatever the probe result is on this machine, resetting must
        // leave the handle uninitialized.
        let _ = backend.is_available();
        backend.reset_probe();
        assert!(!backend.probe.is_initialized());
    }
}
