use crate::config::{Config, RecognitionConfig};
use crate::extract::DateLocale;

pub struct PipelineConfig {
    pub recognition: RecognitionConfig,
    pub confidence_threshold: f32,
    pub date_locale: DateLocale,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            recognition: config.recognition.clone(),
            confidence_threshold: config.confidence_threshold,
            date_locale: config.date_locale,
        }
    }
}
