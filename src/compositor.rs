//! Frame composition
//!
//! Builds the outgoing frame: the mirrored camera image, the whiteboard and
//! its ink when the board is shown, then the controls in a fixed order so
//! later controls cover earlier ones.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::canvas::Canvas;
use crate::interaction::InteractionState;
use crate::ui::UiLayout;

/// Resize a captured frame to the working resolution and mirror it
///
/// Mirroring makes the fingertip move the same way on screen as the hand does.
pub fn prepare_frame(raw: RgbImage, width: u32, height: u32) -> RgbImage {
    let mut frame = if raw.dimensions() == (width, height) {
        raw
    } else {
        imageops::resize(&raw, width, height, FilterType::Triangle)
    };
    imageops::flip_horizontal_in_place(&mut frame);
    frame
}

/// Grayscale intensity with the usual BT.601 weights
pub fn luma(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Composes canvas and controls over live frames
#[derive(Debug, Clone)]
pub struct Compositor {
    /// Canvas pixels at or below this luma count as untouched
    ink_threshold: u8,
}

impl Compositor {
    pub fn new(ink_threshold: u8) -> Self {
        Self { ink_threshold }
    }

    /// Compose one outgoing frame in place
    ///
    /// `cursor` marks the fingertip on frames where a stroke was drawn.
    pub fn compose(
        &self,
        frame: &mut RgbImage,
        canvas: &Canvas,
        state: &InteractionState,
        layout: &UiLayout,
        cursor: Option<(i32, i32)>,
    ) {
        if let Some(center) = cursor {
            fill_disc(frame, center, state.brush_width as i32, state.selected_color);
        }

        if state.panels.board {
            layout.whiteboard.render(frame);
            self.merge_canvas(frame, canvas);
        }

        layout.colors_button.render(frame);
        layout.board_button.render(frame);

        if state.panels.colors {
            for swatch in &layout.color_swatches {
                swatch.render(frame);
            }
            layout.clear_button.render(frame);
        }

        let mut pen_button = layout.pen_button.clone();
        pen_button.fill = state.selected_color;
        pen_button.render(frame);

        if state.panels.pen_sizes {
            for option in &layout.pen_sizes {
                option.control.render(frame);
            }
        }
    }

    /// Replace frame pixels with ink wherever the canvas is brighter than the noise floor
    ///
    /// Ink is opaque; untouched canvas pixels let the frame through unchanged.
    pub fn merge_canvas(&self, frame: &mut RgbImage, canvas: &Canvas) {
        debug_assert_eq!(frame.dimensions(), canvas.image().dimensions());
        for (out, ink) in frame.pixels_mut().zip(canvas.image().pixels()) {
            if luma(*ink) > self.ink_threshold {
                *out = *ink;
            }
        }
    }
}

fn fill_disc(frame: &mut RgbImage, (cx, cy): (i32, i32), radius: i32, color: Rgb<u8>) {
    let r2 = radius * radius;
    for y in (cy - radius).max(0)..=(cy + radius).min(frame.height() as i32 - 1) {
        for x in (cx - radius).max(0)..=(cx + radius).min(frame.width() as i32 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r2 {
                frame.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
