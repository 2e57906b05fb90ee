//! Gesture Board Library
//!
//! A hand-gesture whiteboard over a live camera feed. Each frame a hand is
//! located, its pointer is hit-tested against on-screen controls or used to
//! ink a persistent canvas, and the composed result is streamed as MJPEG.

pub mod camera;
pub mod canvas;
pub mod compositor;
pub mod config;
pub mod error;
pub mod interaction;
pub mod session;
pub mod stream;
pub mod telemetry;
pub mod tracking;
pub mod ui;

pub use canvas::{Canvas, INK_NONE};
pub use compositor::Compositor;
pub use config::AppConfig;
pub use error::{CaptureError, ConfigError, DetectError, EncodeError, LayoutError};
pub use interaction::{DispatchOutcome, Gesture, InteractionState, Panel, UiEvent};
pub use session::{ProcessedFrame, Session};
pub use tracking::{HandDetector, HandObservation, NoDetector, RaisedFingers};
pub use ui::{Control, UiLayout};
