//! Application configuration
//!
//! Loaded once at startup from a JSON file named by `GESTURE_BOARD_CONFIG`.
//! Every field has a default so partial files are accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::telemetry::LogConfig;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "GESTURE_BOARD_CONFIG";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Capture device index (0 for default)
    pub camera_index: u32,
    /// Working frame width; captured frames are resized to it
    pub frame_width: u32,
    /// Working frame height
    pub frame_height: u32,
    /// Bounded wait for a frame before the iteration is skipped
    pub capture_timeout_ms: u64,
    /// HTTP listening port
    pub http_port: u16,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Initial brush width in pixels
    pub brush_width: u32,
    /// Eraser width in pixels
    pub eraser_width: u32,
    /// Frames a toggle button stays locked after it fires
    pub toggle_cooldown_ticks: u32,
    /// Canvas pixels brighter than this (grayscale) are treated as ink
    pub ink_threshold: u8,
    /// Hand landmark ONNX model
    pub model_path: PathBuf,
    /// Minimum hand presence score
    pub detection_confidence: f32,
    /// Release the camera after this many seconds without viewers
    pub idle_release_secs: u64,
    /// Logging
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            frame_width: 1280,
            frame_height: 720,
            capture_timeout_ms: 500,
            http_port: 5000,
            jpeg_quality: 95,
            brush_width: 5,
            eraser_width: 20,
            toggle_cooldown_ticks: 10,
            ink_threshold: 20,
            model_path: PathBuf::from("models/hand_landmark.onnx"),
            detection_confidence: 0.8,
            idle_release_secs: 5,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `GESTURE_BOARD_CONFIG`, or defaults if unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate config text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid("frame size must be non-zero".into()));
        }
        if self.brush_width == 0 || self.eraser_width == 0 {
            return Err(ConfigError::Invalid("brush and eraser widths must be non-zero".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality {} outside 1-100",
                self.jpeg_quality
            )));
        }
        if !(0.0..=1.0).contains(&self.detection_confidence) {
            return Err(ConfigError::Invalid(format!(
                "detection_confidence {} outside 0-1",
                self.detection_confidence
            )));
        }
        Ok(())
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }
}
