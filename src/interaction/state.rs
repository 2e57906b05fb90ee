//! Interaction state
//!
//! The single mutable record of which panels are open and what the brush is.
//! Built once per session, before the first frame.

use image::Rgb;

use crate::canvas::INK_NONE;
use crate::config::AppConfig;

/// Brush color selected at startup
pub const DEFAULT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// A toggleable group of controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Panel {
    Colors,
    PenSizes,
    Board,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Colors, Panel::PenSizes, Panel::Board];
}

/// Independent visibility flag per panel; all hidden at startup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelVisibility {
    pub colors: bool,
    pub pen_sizes: bool,
    pub board: bool,
}

impl PanelVisibility {
    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Colors => self.colors,
            Panel::PenSizes => self.pen_sizes,
            Panel::Board => self.board,
        }
    }

    /// Flip a panel and return its new visibility
    pub fn toggle(&mut self, panel: Panel) -> bool {
        let flag = match panel {
            Panel::Colors => &mut self.colors,
            Panel::PenSizes => &mut self.pen_sizes,
            Panel::Board => &mut self.board,
        };
        *flag = !*flag;
        *flag
    }
}

/// Debounce for the panel toggle buttons
///
/// Counts down once per processed frame and never goes below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    remaining: u32,
    period: u32,
}

impl Cooldown {
    pub fn new(period: u32) -> Self {
        Self { remaining: 0, period }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Lock the toggles for `period` frames
    pub fn arm(&mut self) {
        self.remaining = self.period;
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

/// Everything the dispatcher mutates besides the canvas and control opacity
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionState {
    pub panels: PanelVisibility,
    pub selected_color: Rgb<u8>,
    pub brush_width: u32,
    pub eraser_width: u32,
    pub cooldown: Cooldown,
    /// End of the previous stroke segment while the draw gesture is held
    pub last_stroke_point: Option<(i32, i32)>,
}

impl InteractionState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            panels: PanelVisibility::default(),
            selected_color: DEFAULT_COLOR,
            brush_width: config.brush_width,
            eraser_width: config.eraser_width,
            cooldown: Cooldown::new(config.toggle_cooldown_ticks),
            last_stroke_point: None,
        }
    }

    /// The eraser is selected by picking the no-ink color
    pub fn is_erasing(&self) -> bool {
        self.selected_color == INK_NONE
    }

    /// Width and color the next stroke segment is drawn with
    pub fn stroke(&self) -> (u32, Rgb<u8>) {
        if self.is_erasing() {
            (self.eraser_width, INK_NONE)
        } else {
            (self.brush_width, self.selected_color)
        }
    }
}
