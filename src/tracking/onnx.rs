//! ONNX Runtime hand landmark detector
//!
//! Runs a MediaPipe-compatible hand landmark model (PINTO Model Zoo export):
//! input `[1, 224, 224, 3]` RGB in [0, 1], outputs 63 floats (21 x/y/z in
//! input pixels) followed by a hand presence score.

use std::path::Path;

use image::RgbImage;
use ndarray::Array4;

use super::{HandDetector, HandObservation, Landmark, LANDMARK_COUNT};
use crate::error::DetectError;

/// Model input edge length
const INPUT_SIZE: u32 = 224;

/// Hand landmark detector backed by an ONNX Runtime session
pub struct OnnxHandDetector {
    session: ort::session::Session,
    /// Minimum presence score to report a hand
    confidence: f32,
}

impl OnnxHandDetector {
    /// Load the model
    pub fn new(model_path: &Path, confidence: f32) -> Result<Self, DetectError> {
        if !model_path.exists() {
            return Err(DetectError::ModelNotFound(model_path.to_path_buf()));
        }

        ort::init()
            .with_name("GestureBoard")
            .commit()
            .map_err(|e| DetectError::Runtime(e.to_string()))?;

        let session = ort::session::Session::builder()
            .map_err(|e| DetectError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_intra_threads(2)
            .map_err(|e| DetectError::Runtime(format!("Failed to set threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| DetectError::Runtime(format!("Failed to load hand model: {}", e)))?;

        log::info!("Loaded hand landmark model from {:?}", model_path);

        Ok(Self { session, confidence })
    }
}

impl HandDetector for OnnxHandDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<HandObservation>, DetectError> {
        let input = preprocess_nhwc(frame, INPUT_SIZE);
        let input_array = Array4::from_shape_vec((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3), input)
            .map_err(|e| DetectError::Inference(format!("Failed to create input array: {}", e)))?;
        let input_tensor = ort::value::Tensor::from_array(input_array)
            .map_err(|e| DetectError::Inference(format!("Failed to create tensor: {}", e)))?;

        let confidence = self.confidence;
        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| DetectError::Inference(e.to_string()))?;

        let mut values = outputs.iter();
        let landmarks_output = values
            .next()
            .ok_or_else(|| DetectError::Inference("No output from hand model".into()))?;
        let (_shape, coords) = landmarks_output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectError::Inference(format!("Failed to extract landmarks: {}", e)))?;

        let score = match values.next() {
            Some(presence) => {
                let (_shape, data) = presence
                    .1
                    .try_extract_tensor::<f32>()
                    .map_err(|e| DetectError::Inference(format!("Failed to extract score: {}", e)))?;
                presence_probability(data.first().copied().unwrap_or(0.0))
            }
            None => 1.0,
        };

        if score < confidence {
            return Ok(None);
        }

        Ok(decode_landmarks(coords, frame.width(), frame.height(), INPUT_SIZE)
            .map(HandObservation::from_landmarks))
    }

    fn name(&self) -> &str {
        "onnx-hand-landmark"
    }
}

/// Resize (nearest) to `size`x`size` and convert to HWC floats in [0, 1]
fn preprocess_nhwc(frame: &RgbImage, size: u32) -> Vec<f32> {
    let mut output = vec![0.0f32; (size * size * 3) as usize];
    if frame.width() == 0 || frame.height() == 0 {
        return output;
    }

    let x_ratio = frame.width() as f32 / size as f32;
    let y_ratio = frame.height() as f32 / size as f32;

    for y in 0..size {
        for x in 0..size {
            let src_x = ((x as f32 * x_ratio) as u32).min(frame.width() - 1);
            let src_y = ((y as f32 * y_ratio) as u32).min(frame.height() - 1);
            let pixel = frame.get_pixel(src_x, src_y);

            let out_idx = ((y * size + x) * 3) as usize;
            output[out_idx] = pixel[0] as f32 / 255.0;
            output[out_idx + 1] = pixel[1] as f32 / 255.0;
            output[out_idx + 2] = pixel[2] as f32 / 255.0;
        }
    }

    output
}

/// Some exports emit a logit, others a probability
fn presence_probability(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0 / (1.0 + (-raw).exp())
    }
}

/// Map model-space x/y/z triples back to frame pixels
fn decode_landmarks(
    coords: &[f32],
    frame_width: u32,
    frame_height: u32,
    input_size: u32,
) -> Option<[Landmark; LANDMARK_COUNT]> {
    if coords.len() < LANDMARK_COUNT * 3 {
        log::warn!("Hand model returned {} values, expected {}", coords.len(), LANDMARK_COUNT * 3);
        return None;
    }

    let sx = frame_width as f32 / input_size as f32;
    let sy = frame_height as f32 / input_size as f32;
    let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
    for (i, landmark) in landmarks.iter_mut().enumerate() {
        landmark.x = (coords[i * 3] * sx).round() as i32;
        landmark.y = (coords[i * 3 + 1] * sy).round() as i32;
    }
    Some(landmarks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_preprocess_layout_and_range() {
        let mut frame = RgbImage::from_pixel(448, 448, Rgb([0, 0, 0]));
        frame.put_pixel(0, 0, Rgb([255, 128, 0]));
        let input = preprocess_nhwc(&frame, 224);

        assert_eq!(input.len(), 224 * 224 * 3);
        assert_eq!(input[0], 1.0);
        assert!((input[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(input[2], 0.0);
        assert!(input.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_decode_scales_to_frame() {
        let mut coords = vec![0.0f32; 63];
        coords[8 * 3] = 112.0;
        coords[8 * 3 + 1] = 56.0;
        let landmarks = decode_landmarks(&coords, 1280, 720, 224).unwrap();
        assert_eq!(landmarks[8], Landmark::new(640, 180));
        assert!(decode_landmarks(&coords[..10], 1280, 720, 224).is_none());
    }

    #[test]
    fn test_presence_probability() {
        assert_eq!(presence_probability(0.9), 0.9);
        assert!(presence_probability(5.0) > 0.99);
        assert!(presence_probability(-5.0) < 0.01);
    }

    #[test]
    fn test_missing_model() {
        let result = OnnxHandDetector::new(Path::new("/no/such/hand_landmark.onnx"), 0.8);
        assert!(matches!(result, Err(DetectError::ModelNotFound(_))));
    }
}
