//! Per-frame pipeline
//!
//! A [`Session`] owns everything that persists between frames and turns each
//! raw camera frame into a composed output frame.

use image::RgbImage;

use crate::canvas::Canvas;
use crate::compositor::{prepare_frame, Compositor};
use crate::config::AppConfig;
use crate::error::LayoutError;
use crate::interaction::{dispatch, DispatchOutcome, InteractionState};
use crate::tracking::HandDetector;
use crate::ui::UiLayout;

/// Output of one processed frame
#[derive(Debug)]
pub struct ProcessedFrame {
    pub image: RgbImage,
    pub outcome: DispatchOutcome,
    pub hand_detected: bool,
}

/// Drawing session: layout, interaction state, canvas and detector
pub struct Session {
    width: u32,
    height: u32,
    layout: UiLayout,
    state: InteractionState,
    canvas: Canvas,
    compositor: Compositor,
    detector: Box<dyn HandDetector>,
}

impl Session {
    /// Session with the standard layout and a random first swatch
    pub fn new(config: &AppConfig, detector: Box<dyn HandDetector>) -> Result<Self, LayoutError> {
        Self::with_layout(config, UiLayout::with_random_swatch(), detector)
    }

    /// Session with an explicit layout, validated against the frame size
    pub fn with_layout(
        config: &AppConfig,
        layout: UiLayout,
        detector: Box<dyn HandDetector>,
    ) -> Result<Self, LayoutError> {
        let (width, height) = config.frame_size();
        layout.validate(width, height)?;

        tracing::info!(width, height, detector = detector.name(), "Session ready");
        Ok(Self {
            width,
            height,
            layout,
            state: InteractionState::new(config),
            canvas: Canvas::new(width, height),
            compositor: Compositor::new(config.ink_threshold),
            detector,
        })
    }

    /// Run detection, dispatch and composition for one captured frame
    ///
    /// Detector failures are logged and treated as a frame without a hand.
    pub fn process(&mut self, raw: RgbImage) -> ProcessedFrame {
        let mut frame = prepare_frame(raw, self.width, self.height);

        let hand = match self.detector.detect(&frame) {
            Ok(hand) => hand,
            Err(e) => {
                tracing::warn!(error = %e, "Hand detection failed");
                None
            }
        };

        let outcome = dispatch(&mut self.state, &mut self.layout, &mut self.canvas, hand.as_ref());
        self.compositor
            .compose(&mut frame, &self.canvas, &self.state, &self.layout, outcome.cursor);

        ProcessedFrame {
            image: frame,
            outcome,
            hand_detected: hand.is_some(),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn layout(&self) -> &UiLayout {
        &self.layout
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
