use std::fs;
use std::path::Path;

use egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables of an edit domain, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undoable commands, unbounded when absent
    pub undo_limit: Option<usize>,
    /// Distance in points a pressed pointer must travel before it drags
    pub drag_threshold: f32,
    pub tree_row_height: f32,
    pub tree_indent: f32,
    /// Size of the figure canvas, width then height
    pub canvas_size: [f32; 2],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: None,
            drag_threshold: 3.0,
            tree_row_height: 20.0,
            tree_indent: 16.0,
            canvas_size: [800.0, 600.0],
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.undo_limit == Some(0) {
            return Err(ConfigError::Invalid("undo_limit must be at least 1".into()));
        }
        if self.drag_threshold.is_nan() || self.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "drag_threshold must not be negative, got {}",
                self.drag_threshold
            )));
        }
        if self.tree_row_height.is_nan() || self.tree_row_height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tree_row_height must be positive, got {}",
                self.tree_row_height
            )));
        }
        if self.tree_indent.is_nan() || self.tree_indent <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tree_indent must be positive, got {}",
                self.tree_indent
            )));
        }
        if self.canvas_size.iter().any(|side| side.is_nan() || *side <= 0.0) {
            return Err(ConfigError::Invalid("canvas_size must be positive".into()));
        }
        Ok(())
    }

    pub fn canvas_size(&self) -> Vec2 {
        vec2(self.canvas_size[0], self.canvas_size[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = EditorConfig::from_json(r#"{ "undo_limit": 50 }"#).unwrap();
        assert_eq!(config.undo_limit, Some(50));
        assert_eq!(config.drag_threshold, 3.0);
        assert_eq!(config.canvas_size(), vec2(800.0, 600.0));
    }

    #[test]
    fn test_zero_undo_limit_is_rejected() {
        let result = EditorConfig::from_json(r#"{ "undo_limit": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_tree_indent_is_rejected() {
        let result = EditorConfig::from_json(r#"{ "tree_indent": 0.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = EditorConfig::from_json("{ undo_limit");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EditorConfig {
            undo_limit: Some(10),
            ..EditorConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
