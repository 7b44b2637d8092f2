use std::path::Path;

use crate::config::schema::{Config, KNOWN_BACKENDS};
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Validates every recognized option once at startup; nothing downstream
/// re-checks these.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be greater than 0".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&config.confidence_threshold) {
        return Err(ConfigError::Validation {
            message: format!(
                "confidence_threshold must be within [0, 1], got {}",
                config.confidence_threshold
            ),
        });
    }

    if config.recognition.preference.is_empty() {
        return Err(ConfigError::Validation {
            message: "recognition.preference must not be empty".to_string(),
        });
    }

    let mut seen = std::collections::HashSet::new();
    for name in &config.recognition.preference {
        if !KNOWN_BACKENDS.contains(&name.as_str()) {
            return Err(ConfigError::UnknownBackend { name: name.clone() });
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate backend '{}' in preference list", name),
            });
        }
    }

    if let Some(forced) = &config.recognition.forced_backend {
        if !KNOWN_BACKENDS.contains(&forced.as_str()) {
            return Err(ConfigError::UnknownBackend {
                name: forced.clone(),
            });
        }
    }

    if config.recognition.languages.is_empty() {
        return Err(ConfigError::Validation {
            message: "recognition.languages must not be empty".to_string(),
        });
    }

    Ok(())
}
