//! Editor configuration.

use crate::camera::{MAX_SCALE, MIN_SCALE};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::registry::DEFAULT_ELEMENT_SIZE;
use crate::selection::{HANDLE_HIT_TOLERANCE, MIN_ELEMENT_SIZE};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// What an unmodified wheel event does over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelPolicy {
    /// Zoom one fixed step per notch, anchored at the pointer.
    #[default]
    StepZoom,
    /// Pan the canvas by the wheel delta.
    Scroll,
}

/// Tunables for the editor. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Smallest width or height a resize may produce, in canvas units.
    pub min_element_size: f64,
    pub default_element_size: Size,
    pub wheel_policy: WheelPolicy,
    /// Scale change per wheel notch under [`WheelPolicy::StepZoom`].
    pub wheel_zoom_step: f64,
    /// Scale change per wheel delta unit when the zoom modifier is held.
    pub wheel_zoom_sensitivity: f64,
    /// Handle hit radius in screen pixels.
    pub handle_tolerance: f64,
    pub max_history: usize,
    /// How long notifications stay visible.
    pub notification_ttl_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            min_element_size: MIN_ELEMENT_SIZE,
            default_element_size: DEFAULT_ELEMENT_SIZE,
            wheel_policy: WheelPolicy::default(),
            wheel_zoom_step: 0.1,
            wheel_zoom_sensitivity: 0.002,
            handle_tolerance: HANDLE_HIT_TOLERANCE,
            max_history: DEFAULT_MAX_HISTORY,
            notification_ttl_ms: 3000,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON and check its values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable editor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_scale must be positive, got {}",
                self.min_scale
            )));
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            return Err(ConfigError::Invalid(format!(
                "max_scale {} is below min_scale {}",
                self.max_scale, self.min_scale
            )));
        }
        if !(self.min_element_size.is_finite() && self.min_element_size >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_element_size must not be negative, got {}",
                self.min_element_size
            )));
        }
        Ok(())
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {:?}", path.as_ref());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.min_scale, 0.1);
        assert_eq!(config.max_scale, 2.0);
        assert_eq!(config.min_element_size, 50.0);
        assert_eq!(config.default_element_size, Size::new(200.0, 100.0));
        assert_eq!(config.wheel_policy, WheelPolicy::StepZoom);
        assert_eq!(config.max_history, 100);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "wheel_policy": "scroll", "max_history": 20 }"#).unwrap();
        assert_eq!(config.wheel_policy, WheelPolicy::Scroll);
        assert_eq!(config.max_history, 20);
        assert_eq!(config.wheel_zoom_step, 0.1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EditorConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_inverted_scale_limits_rejected() {
        let result = EditorConfig::from_json(r#"{ "min_scale": 3.0, "max_scale": 1.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(matches!(
            EditorConfig::from_json(r#"{ "min_scale": 0.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "min_element_size": 20.0 }}"#).unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.min_element_size, 20.0);

        assert!(matches!(
            EditorConfig::load(file.path().with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
