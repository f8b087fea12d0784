//! Editor configuration.
//!
//! Loaded from JSON; every field is optional and falls back to the values
//! in [`EditorConfig::default`].

use sk_core::{CanvasSize, Dialect, ShapeKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: i32,
    pub canvas_height: i32,
    /// Pixels moved per arrow-key nudge.
    pub arrow_step: i32,
    /// Side length of the square resize handles.
    pub handle_size: i32,
    /// Delay between a canvas change and regeneration; 0 regenerates
    /// synchronously.
    pub regenerate_debounce_ms: u64,
    /// Delay between a code edit and parsing; 0 parses synchronously.
    pub parse_debounce_ms: u64,
    pub initial_dialect: Dialect,
    /// Kind created by the "add shape" action.
    pub default_shape: ShapeKind,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let canvas = CanvasSize::default();
        Self {
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            arrow_step: 10,
            handle_size: 8,
            regenerate_debounce_ms: 0,
            parse_debounce_ms: 0,
            initial_dialect: Dialect::Markup,
            default_shape: ShapeKind::Rectangle,
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::debug!("loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |key: &'static str, value: i32| {
            if value > 0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidSetting {
                    key,
                    reason: format!("must be positive, got {value}"),
                })
            }
        };
        positive("canvas_width", self.canvas_width)?;
        positive("canvas_height", self.canvas_height)?;
        positive("arrow_step", self.arrow_step)?;
        positive("handle_size", self.handle_size)?;
        Ok(())
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }

    pub fn regenerate_delay(&self) -> Duration {
        Duration::from_millis(self.regenerate_debounce_ms)
    }

    pub fn parse_delay(&self) -> Duration {
        Duration::from_millis(self.parse_debounce_ms)
    }

    pub fn with_canvas(mut self, canvas: CanvasSize) -> Self {
        self.canvas_width = canvas.width;
        self.canvas_height = canvas.height;
        self
    }

    pub fn with_debounce(mut self, regenerate_ms: u64, parse_ms: u64) -> Self {
        self.regenerate_debounce_ms = regenerate_ms;
        self.parse_debounce_ms = parse_ms;
        self
    }
}
