//! Rectangular on-screen control
//!
//! A filled, optionally labelled rectangle that is alpha-blended over the
//! frame and hit-tested against the tracked fingertip.

use image::{Rgb, RgbImage};

use super::font;
use crate::error::LayoutError;

/// Opacity of a control at rest
pub const DEFAULT_OPACITY: f32 = 0.5;
/// Opacity of a control that was hit this frame
pub const PRESSED_OPACITY: f32 = 0.0;

const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_SCALE: u32 = 2;
const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE_THICKNESS: u32 = 2;

/// Axis-aligned control rectangle
///
/// `opacity` is the weight of the background: 1.0 leaves the frame untouched,
/// 0.0 paints the fill color solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub fill: Rgb<u8>,
    pub label: String,
    pub opacity: f32,
    /// Draw a white border after the label
    pub outlined: bool,
}

impl Control {
    /// Create an outlined control at default opacity
    pub fn new(x: u32, y: u32, width: u32, height: u32, fill: Rgb<u8>, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill,
            label: label.into(),
            opacity: DEFAULT_OPACITY,
            outlined: true,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn without_outline(mut self) -> Self {
        self.outlined = false;
        self
    }

    /// True iff the point lies strictly inside the rectangle; edges are outside
    pub fn is_over(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        let (x, y) = (self.x as i64, self.y as i64);
        x < px && px < x + self.width as i64 && y < py && py < y + self.height as i64
    }

    /// Show hit feedback (`true`) or return to rest opacity
    pub fn set_pressed(&mut self, pressed: bool) {
        self.opacity = if pressed { PRESSED_OPACITY } else { DEFAULT_OPACITY };
    }

    pub fn is_pressed(&self) -> bool {
        self.opacity == PRESSED_OPACITY
    }

    /// Check that the footprint is non-empty and inside a frame of the given size
    pub fn check_bounds(&self, name: &str, frame_width: u32, frame_height: u32) -> Result<(), LayoutError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayoutError::ZeroSize { name: name.to_string() });
        }
        let fits_x = self.x.checked_add(self.width).is_some_and(|r| r <= frame_width);
        let fits_y = self.y.checked_add(self.height).is_some_and(|b| b <= frame_height);
        if !(fits_x && fits_y) {
            return Err(LayoutError::OutOfBounds {
                name: name.to_string(),
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                frame_width,
                frame_height,
            });
        }
        Ok(())
    }

    /// Blend the fill over the footprint, then draw the centered label and the outline
    ///
    /// Layouts are validated at startup, so an out-of-frame footprint is a bug:
    /// debug builds assert, release builds clip.
    pub fn render(&self, frame: &mut RgbImage) {
        debug_assert!(
            self.check_bounds(&self.label, frame.width(), frame.height()).is_ok(),
            "control {:?} outside {}x{} frame",
            self,
            frame.width(),
            frame.height()
        );

        let x_end = (self.x + self.width).min(frame.width());
        let y_end = (self.y + self.height).min(frame.height());
        if self.x >= x_end || self.y >= y_end {
            return;
        }

        let alpha = self.opacity.clamp(0.0, 1.0);
        for py in self.y..y_end {
            for px in self.x..x_end {
                let bg = *frame.get_pixel(px, py);
                frame.put_pixel(px, py, blend(bg, self.fill, alpha));
            }
        }

        if !self.label.is_empty() {
            let (tw, th) = font::text_extent(&self.label, LABEL_SCALE);
            let tx = self.x as i32 + self.width as i32 / 2 - tw as i32 / 2;
            let ty = self.y as i32 + self.height as i32 / 2 - th as i32 / 2;
            font::draw_text(frame, tx, ty, &self.label, LABEL_SCALE, LABEL_COLOR);
        }

        if self.outlined {
            let t = OUTLINE_THICKNESS;
            for py in self.y..y_end {
                for px in self.x..x_end {
                    let on_edge = px < self.x + t
                        || py < self.y + t
                        || px + t >= self.x + self.width
                        || py + t >= self.y + self.height;
                    if on_edge {
                        frame.put_pixel(px, py, OUTLINE_COLOR);
                    }
                }
            }
        }
    }
}

/// `alpha * background + (1 - alpha) * fill`, per channel, rounded
pub fn blend(background: Rgb<u8>, fill: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mut out = [0u8; 3];
    for c in 0..3 {
        let v = alpha * background[c] as f32 + (1.0 - alpha) * fill[c] as f32;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}
