//! Persistent drawing layer
//!
//! An RGB raster the size of the working frame. Untouched pixels hold
//! [`INK_NONE`]; strokes are rasterized as round-capped thick segments.
//! Erasing is drawing with `INK_NONE`.

use image::{Rgb, RgbImage};

/// Sentinel meaning "no ink". Selecting it as the brush color makes the brush an eraser.
pub const INK_NONE: Rgb<u8> = Rgb([0, 0, 0]);

/// Persistent stroke buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    buffer: RgbImage,
}

impl Canvas {
    /// Create an empty canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: RgbImage::from_pixel(width, height, INK_NONE),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.buffer.get_pixel(x, y)
    }

    /// True if no pixel holds ink
    pub fn is_blank(&self) -> bool {
        self.buffer.pixels().all(|p| *p == INK_NONE)
    }

    /// Discard every stroke. There is no undo.
    pub fn clear(&mut self) {
        self.buffer = RgbImage::from_pixel(self.buffer.width(), self.buffer.height(), INK_NONE);
    }

    /// Rasterize a thick segment from `from` to `to`
    ///
    /// Sets every pixel whose center lies within `width / 2` of the segment,
    /// so the stroke has round caps and a zero-length segment is a dot.
    /// Pixels outside the canvas are skipped. Re-drawing the same segment sets
    /// the same pixels to the same color.
    pub fn draw_segment(&mut self, from: (i32, i32), to: (i32, i32), width: u32, color: Rgb<u8>) {
        if width == 0 {
            return;
        }
        let radius = width as f32 / 2.0;
        let reach = radius.ceil() as i32;

        let x_min = (from.0.min(to.0) - reach).max(0);
        let y_min = (from.1.min(to.1) - reach).max(0);
        let x_max = (from.0.max(to.0) + reach).min(self.buffer.width() as i32 - 1);
        let y_max = (from.1.max(to.1) + reach).min(self.buffer.height() as i32 - 1);
        if x_min > x_max || y_min > y_max {
            return;
        }

        let r2 = radius * radius;
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                if distance_sq_to_segment((x, y), from, to) <= r2 {
                    self.buffer.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}

/// Squared distance from point `p` to the segment `a`-`b`
fn distance_sq_to_segment(p: (i32, i32), a: (i32, i32), b: (i32, i32)) -> f32 {
    let (px, py) = (p.0 as f32, p.1 as f32);
    let (ax, ay) = (a.0 as f32, a.1 as f32);
    let (bx, by) = (b.0 as f32, b.1 as f32);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (px - cx) * (px - cx) + (py - cy) * (py - cy)
}
