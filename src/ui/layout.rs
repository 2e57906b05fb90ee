//! The fixed control layout
//!
//! Geometry is tuned for a 1280x720 working frame; [`UiLayout::validate`]
//! rejects it at startup for frames it does not fit.

use image::Rgb;
use rand::Rng;

use super::control::Control;
use crate::canvas::INK_NONE;
use crate::error::LayoutError;

pub const COLORS_LABEL: &str = "Colors";
pub const PEN_LABEL: &str = "Pen";
pub const BOARD_LABEL: &str = "Board";
/// Label shown on a toggle button while its panel is open
pub const HIDE_LABEL: &str = "Hide";
pub const ERASER_LABEL: &str = "Eraser";
pub const CLEAR_LABEL: &str = "Clear";

/// Brush widths offered by the pen-size panel
pub const PEN_WIDTHS: [u32; 4] = [5, 10, 15, 20];

const WHITEBOARD_OPACITY: f32 = 0.6;

/// A pen-size option and the width it selects
#[derive(Debug, Clone, PartialEq)]
pub struct SizeOption {
    pub control: Control,
    pub width: u32,
}

/// All on-screen controls
#[derive(Debug, Clone, PartialEq)]
pub struct UiLayout {
    pub board_button: Control,
    pub colors_button: Control,
    pub pen_button: Control,
    /// Color swatches; each selects its fill color. The last one is the eraser.
    pub color_swatches: Vec<Control>,
    pub clear_button: Control,
    pub pen_sizes: Vec<SizeOption>,
    /// Drawable region; also the backdrop blended in while the board is shown
    pub whiteboard: Control,
}

impl UiLayout {
    /// Standard layout with a random first swatch
    pub fn with_random_swatch() -> Self {
        let mut rng = rand::rng();
        let random = Rgb([rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()]);
        tracing::debug!(color = ?random.0, "Random swatch color");
        Self::standard(random)
    }

    /// Standard layout with the given first swatch color
    pub fn standard(first_swatch: Rgb<u8>) -> Self {
        let swatch_colors: [(Rgb<u8>, &str); 6] = [
            (first_swatch, ""),
            (Rgb([255, 0, 0]), ""),
            (Rgb([0, 0, 255]), ""),
            (Rgb([0, 255, 0]), ""),
            (Rgb([255, 255, 0]), ""),
            (INK_NONE, ERASER_LABEL),
        ];
        let color_swatches = swatch_colors
            .iter()
            .enumerate()
            .map(|(i, (color, label))| Control::new(300 + 100 * i as u32, 0, 100, 100, *color, *label))
            .collect();

        let pen_sizes = PEN_WIDTHS
            .iter()
            .enumerate()
            .map(|(i, &width)| SizeOption {
                control: Control::new(1100, 50 + 100 * i as u32, 100, 100, Rgb([50, 50, 50]), width.to_string()),
                width,
            })
            .collect();

        Self {
            board_button: Control::new(50, 0, 100, 100, Rgb([0, 255, 255]), BOARD_LABEL),
            colors_button: Control::new(200, 0, 100, 100, Rgb([0, 255, 120]), COLORS_LABEL),
            pen_button: Control::new(1100, 0, 100, 50, Rgb([0, 0, 255]), PEN_LABEL),
            color_swatches,
            clear_button: Control::new(900, 0, 100, 100, Rgb([100, 100, 100]), CLEAR_LABEL),
            pen_sizes,
            whiteboard: Control::new(50, 120, 1020, 580, Rgb([255, 255, 255]), "")
                .with_opacity(WHITEBOARD_OPACITY)
                .without_outline(),
        }
    }

    /// Check every control against the frame size; run once before the loop starts
    pub fn validate(&self, frame_width: u32, frame_height: u32) -> Result<(), LayoutError> {
        self.named_controls()
            .try_for_each(|(name, control)| control.check_bounds(&name, frame_width, frame_height))
    }

    fn named_controls(&self) -> impl Iterator<Item = (String, &Control)> {
        let buttons = [
            ("board_button".to_string(), &self.board_button),
            ("colors_button".to_string(), &self.colors_button),
            ("pen_button".to_string(), &self.pen_button),
            ("clear_button".to_string(), &self.clear_button),
            ("whiteboard".to_string(), &self.whiteboard),
        ];
        let swatches = self
            .color_swatches
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("color_swatch[{i}]"), c));
        let sizes = self
            .pen_sizes
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("pen_size[{i}]"), &s.control));
        buttons.into_iter().chain(swatches).chain(sizes)
    }
}
