//! Error types
//!
//! One enum per concern. None of these are fatal inside the per-frame loop:
//! the session and producer degrade to passing the frame through.

use std::path::PathBuf;

/// Failures while pulling frames from a capture device
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to open camera {index}: {reason}")]
    Open { index: u32, reason: String },
    #[error("Failed to fetch frame: {0}")]
    Frame(String),
    #[error("Failed to decode frame: {0}")]
    Decode(String),
    #[error("No frame within {0} ms")]
    Timeout(u64),
    #[error("Capture thread is no longer running")]
    Disconnected,
}

impl CaptureError {
    /// Transient errors are retried on the next iteration
    pub fn is_transient(&self) -> bool {
        !matches!(self, CaptureError::Open { .. } | CaptureError::Disconnected)
    }
}

/// Failures from the hand detector
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Model not found: {0:?}")]
    ModelNotFound(PathBuf),
    #[error("Failed to initialize ONNX Runtime: {0}")]
    Runtime(String),
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Failures while encoding an outgoing frame
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Control geometry that cannot be rendered into the frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Control '{name}' has zero size")]
    ZeroSize { name: String },
    #[error("Control '{name}' at ({x},{y}) {width}x{height} exceeds frame {frame_width}x{frame_height}")]
    OutOfBounds {
        name: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Failures while loading the application config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}
