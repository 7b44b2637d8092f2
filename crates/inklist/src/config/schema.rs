use serde::{Deserialize, Serialize};

use crate::extract::DateLocale;

/// Backend names recognized in preference lists and forced overrides.
pub const KNOWN_BACKENDS: &[&str] = &["vlm", "tesseract", "stub"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    /// Tasks scoring below this are flagged low-confidence (never dropped).
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Resolves ambiguous slash dates. Configured once, never inferred
    /// per value.
    #[serde(default)]
    pub date_locale: DateLocale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            worker_count: default_worker_count(),
            recognition: RecognitionConfig::default(),
            confidence_threshold: default_confidence_threshold(),
            date_locale: DateLocale::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

fn default_confidence_threshold() -> f32 {
    0.6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Backends tried top-down until one produces a usable result.
    #[serde(default = "default_preference")]
    pub preference: Vec<String>,
    /// Bypasses fallback entirely when set.
    #[serde(default)]
    pub forced_backend: Option<String>,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Directory holding vision-language model weights.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
    /// Hugging Face repo to pull weights from when the model directory is
    /// empty, e.g. "acme/notes-vlm".
    #[serde(default)]
    pub model_repo: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            preference: default_preference(),
            forced_backend: None,
            languages: default_languages(),
            model_dir: default_model_dir(),
            model_repo: None,
        }
    }
}

fn default_preference() -> Vec<String> {
    vec![
        "vlm".to_string(),
        "tesseract".to_string(),
        "stub".to_string(),
    ]
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

fn default_model_dir() -> String {
    "./weights".to_string()
}
