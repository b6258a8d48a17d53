//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const OUTPUT_FORMATS: [&str; 3] = ["json", "jsonl", "attrs"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.input_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.input_dir must not be empty".into(),
            ));
        }
        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "paths.output_dir must not be empty".into(),
            ));
        }
        if self.paths.public_path.as_deref() == Some("") {
            return Err(ConfigError::ValidationError(
                "paths.public_path must not be empty when set".into(),
            ));
        }
        if let Some(widths) = &self.images.widths {
            if widths.contains(&0) {
                return Err(ConfigError::ValidationError(
                    "images.widths entries must be > 0".into(),
                ));
            }
        }
        if let Some(quality) = self.images.quality {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::ValidationError(
                    "images.quality must be between 1 and 100".into(),
                ));
            }
        }
        if !OUTPUT_FORMATS.contains(&self.output.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be one of {}",
                OUTPUT_FORMATS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
