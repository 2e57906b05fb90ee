//! Hand tracking interface
//!
//! The pipeline only needs the 21 hand landmarks in frame pixel coordinates
//! and which fingers are raised. Landmark indices follow the MediaPipe hand
//! convention (0 = wrist, 4 = thumb tip, 8 = index tip, ...).

pub mod onnx;

use image::RgbImage;

use crate::error::DetectError;

pub use onnx::OnnxHandDetector;

/// Landmarks per hand
pub const LANDMARK_COUNT: usize = 21;
/// Index fingertip, the interaction pointer
pub const INDEX_TIP: usize = 8;

const THUMB_TIP: usize = 4;
const THUMB_IP: usize = 3;
const INDEX_MCP: usize = 5;
/// Fingertips of index, middle, ring and pinky. The DIP and PIP joints sit at tip-1 and tip-2.
const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];

/// A landmark in frame pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Landmark {
    pub x: i32,
    pub y: i32,
}

impl Landmark {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Raised/curled flags indexed thumb..pinky
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RaisedFingers(pub [bool; 5]);

impl RaisedFingers {
    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    pub fn index(&self) -> bool {
        self.0[1]
    }

    pub fn middle(&self) -> bool {
        self.0[2]
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|&up| up)
    }

    /// Derive the flags from landmark geometry
    pub fn from_landmarks(landmarks: &[Landmark; LANDMARK_COUNT]) -> Self {
        let mut raised = [false; 5];

        let knuckle_x = landmarks[INDEX_MCP].x;
        raised[0] = (landmarks[THUMB_TIP].x - knuckle_x).abs() > (landmarks[THUMB_IP].x - knuckle_x).abs();

        for (finger, &tip) in FINGER_TIPS.iter().enumerate() {
            let (tip_y, dip_y, pip_y) = (landmarks[tip].y, landmarks[tip - 1].y, landmarks[tip - 2].y);
            raised[finger + 1] = tip_y < dip_y && dip_y < pip_y;
        }

        Self(raised)
    }
}

/// One detected hand
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub fingers: RaisedFingers,
}

impl HandObservation {
    /// Build an observation, deriving raised fingers from the landmarks
    pub fn from_landmarks(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        let fingers = RaisedFingers::from_landmarks(&landmarks);
        Self { landmarks, fingers }
    }

    /// Observation with explicit finger flags; every landmark sits at the pointer
    pub fn pointing(pointer: (i32, i32), fingers: [bool; 5]) -> Self {
        Self {
            landmarks: [Landmark::new(pointer.0, pointer.1); LANDMARK_COUNT],
            fingers: RaisedFingers(fingers),
        }
    }

    /// Index fingertip position
    pub fn pointer(&self) -> (i32, i32) {
        let tip = self.landmarks[INDEX_TIP];
        (tip.x, tip.y)
    }
}

/// Locates a single hand in a frame
pub trait HandDetector: Send {
    /// `Ok(None)` when no hand is found
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<HandObservation>, DetectError>;

    fn name(&self) -> &str;
}

/// Detector used when no model is available; never finds a hand
#[derive(Debug, Default)]
pub struct NoDetector;

impl HandDetector for NoDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Option<HandObservation>, DetectError> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// An upright right hand (mirrored view) with the given fingers extended
    pub(crate) fn synthetic_hand(raised: [bool; 5]) -> [Landmark; LANDMARK_COUNT] {
        let mut lm = [Landmark::default(); LANDMARK_COUNT];
        lm[0] = Landmark::new(300, 500);

        // Thumb: extended tip sits far left of the knuckle
        lm[1] = Landmark::new(270, 470);
        lm[2] = Landmark::new(250, 440);
        lm[3] = Landmark::new(235, 420);
        lm[4] = if raised[0] { Landmark::new(200, 400) } else { Landmark::new(270, 420) };

        for (finger, base_x) in [(1usize, 280), (2, 300), (3, 320), (4, 340)] {
            let mcp = finger * 4 + 1;
            lm[mcp] = Landmark::new(base_x, 400);
            lm[mcp + 1] = Landmark::new(base_x, 350);
            if raised[finger] {
                lm[mcp + 2] = Landmark::new(base_x, 310);
                lm[mcp + 3] = Landmark::new(base_x, 280);
            } else {
                lm[mcp + 2] = Landmark::new(base_x, 380);
                lm[mcp + 3] = Landmark::new(base_x, 400);
            }
        }
        lm
    }

    #[test]
    fn test_raised_fingers_from_geometry() {
        for raised in [
            [false; 5],
            [true; 5],
            [false, true, false, false, false],
            [false, true, true, false, false],
            [true, false, false, false, true],
        ] {
            let fingers = RaisedFingers::from_landmarks(&synthetic_hand(raised));
            assert_eq!(fingers.0, raised);
        }
    }

    #[test]
    fn test_pointer_is_index_tip() {
        let hand = HandObservation::from_landmarks(synthetic_hand([false, true, false, false, false]));
        assert_eq!(hand.pointer(), (280, 280));
        assert!(hand.fingers.index());
        assert!(!hand.fingers.middle());
        assert!(hand.fingers.any());
    }

    #[test]
    fn test_no_detector_finds_nothing() {
        let mut detector = NoDetector;
        let frame = RgbImage::new(8, 8);
        assert!(detector.detect(&frame).unwrap().is_none());
    }
}
