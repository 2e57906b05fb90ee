//! Per-frame gesture dispatch
//!
//! Classifies the hand pose, hit-tests the pointer against the visible
//! controls, and applies the result to the interaction state and canvas.
//!
//! Transition table (pointer = index fingertip):
//!
//! | fingers                | pointer over whiteboard | gesture |
//! |------------------------|-------------------------|---------|
//! | index up               | no                      | Select  |
//! | index up, middle down  | yes                     | Draw    |
//! | index up, middle up    | yes                     | Idle    |
//! | index down, any raised | -                       | Idle    |
//! | none raised (fist)     | -                       | Idle    |
//! | no hand                | -                       | skipped |

use image::Rgb;

use super::state::{InteractionState, Panel};
use crate::canvas::Canvas;
use crate::tracking::HandObservation;
use crate::ui::layout::{BOARD_LABEL, COLORS_LABEL, HIDE_LABEL, PEN_LABEL};
use crate::ui::{Control, UiLayout};

/// What the hand is doing this frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// Navigate controls
    Select,
    /// Ink the canvas
    Draw,
    /// Neither; any stroke in progress ends
    Idle,
}

/// Classify a detected hand. A closed fist is Idle, so it ends any stroke.
pub fn classify(hand: &HandObservation, whiteboard: &Control) -> Gesture {
    let fingers = hand.fingers;
    let (x, y) = hand.pointer();
    let over_board = whiteboard.is_over(x, y);

    if fingers.index() && !over_board {
        Gesture::Select
    } else if fingers.index() && !fingers.middle() {
        Gesture::Draw
    } else {
        Gesture::Idle
    }
}

/// A state change caused by a control hit
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    BrushWidthSelected(u32),
    ColorSelected(Rgb<u8>),
    CanvasCleared,
    PanelToggled { panel: Panel, visible: bool },
}

/// Result of one dispatch
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchOutcome {
    pub gesture: Option<Gesture>,
    pub events: Vec<UiEvent>,
    /// Fingertip to mark on the outgoing frame after a stroke was drawn
    pub cursor: Option<(i32, i32)>,
}

/// Run one frame of interaction
///
/// `hand` is `None` when detection found nothing; the frame then only
/// advances the cooldown.
pub fn dispatch(
    state: &mut InteractionState,
    layout: &mut UiLayout,
    canvas: &mut Canvas,
    hand: Option<&HandObservation>,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();

    if let Some(hand) = hand {
        let gesture = classify(hand, &layout.whiteboard);
        outcome.gesture = Some(gesture);
        match gesture {
            Gesture::Select => select(state, layout, canvas, hand.pointer(), &mut outcome.events),
            Gesture::Draw => {
                if draw(state, canvas, hand.pointer()) {
                    outcome.cursor = Some(hand.pointer());
                }
            }
            Gesture::Idle => state.last_stroke_point = None,
        }
    }

    state.cooldown.tick();

    for event in &outcome.events {
        tracing::info!(?event, "Control activated");
    }
    outcome
}

fn select(
    state: &mut InteractionState,
    layout: &mut UiLayout,
    canvas: &mut Canvas,
    (x, y): (i32, i32),
    events: &mut Vec<UiEvent>,
) {
    state.last_stroke_point = None;

    if state.panels.pen_sizes {
        for option in &mut layout.pen_sizes {
            let hit = option.control.is_over(x, y);
            option.control.set_pressed(hit);
            if hit {
                state.brush_width = option.width;
                events.push(UiEvent::BrushWidthSelected(option.width));
            }
        }
    }

    if state.panels.colors {
        for swatch in &mut layout.color_swatches {
            let hit = swatch.is_over(x, y);
            swatch.set_pressed(hit);
            if hit {
                state.selected_color = swatch.fill;
                events.push(UiEvent::ColorSelected(swatch.fill));
            }
        }

        let hit = layout.clear_button.is_over(x, y);
        layout.clear_button.set_pressed(hit);
        if hit {
            canvas.clear();
            events.push(UiEvent::CanvasCleared);
        }
    }

    let toggles = [
        (Panel::Colors, &mut layout.colors_button, COLORS_LABEL),
        (Panel::PenSizes, &mut layout.pen_button, PEN_LABEL),
        (Panel::Board, &mut layout.board_button, BOARD_LABEL),
    ];
    for (panel, button, rest_label) in toggles {
        let fired = button.is_over(x, y) && state.cooldown.is_ready();
        button.set_pressed(fired);
        if fired {
            state.cooldown.arm();
            let visible = state.panels.toggle(panel);
            button.label = if visible { HIDE_LABEL } else { rest_label }.to_string();
            events.push(UiEvent::PanelToggled { panel, visible });
        }
    }
}

/// Append a segment to the canvas. Returns false when the board is hidden.
fn draw(state: &mut InteractionState, canvas: &mut Canvas, point: (i32, i32)) -> bool {
    if !state.panels.board {
        return false;
    }
    let from = state.last_stroke_point.unwrap_or(point);
    let (width, color) = state.stroke();
    canvas.draw_segment(from, point, width, color);
    state.last_stroke_point = Some(point);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::INK_NONE;
    use crate::config::AppConfig;
    use crate::ui::{DEFAULT_OPACITY, PRESSED_OPACITY};

    const INDEX_ONLY: [bool; 5] = [false, true, false, false, false];
    const TWO_UP: [bool; 5] = [false, true, true, false, false];
    const FIST: [bool; 5] = [false; 5];
    const PINKY_ONLY: [bool; 5] = [false, false, false, false, true];

    struct Fixture {
        state: InteractionState,
        layout: UiLayout,
        canvas: Canvas,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: InteractionState::new(&AppConfig::default()),
                layout: UiLayout::standard(Rgb([10, 20, 30])),
                canvas: Canvas::new(1280, 720),
            }
        }

        fn frame(&mut self, pointer: (i32, i32), fingers: [bool; 5]) -> DispatchOutcome {
            let hand = HandObservation::pointing(pointer, fingers);
            dispatch(&mut self.state, &mut self.layout, &mut self.canvas, Some(&hand))
        }

        fn empty_frame(&mut self) -> DispatchOutcome {
            dispatch(&mut self.state, &mut self.layout, &mut self.canvas, None)
        }
    }

    fn center(control: &Control) -> (i32, i32) {
        ((control.x + control.width / 2) as i32, (control.y + control.height / 2) as i32)
    }

    #[test]
    fn test_classify() {
        let layout = UiLayout::standard(Rgb([0, 0, 0]));
        let board = &layout.whiteboard;
        let inside = (500, 400);
        let outside = (500, 50);

        let g = |p, f| classify(&HandObservation::pointing(p, f), board);
        assert_eq!(g(outside, INDEX_ONLY), Gesture::Select);
        assert_eq!(g(outside, TWO_UP), Gesture::Select);
        assert_eq!(g(inside, INDEX_ONLY), Gesture::Draw);
        assert_eq!(g(inside, TWO_UP), Gesture::Idle);
        assert_eq!(g(inside, PINKY_ONLY), Gesture::Idle);
        assert_eq!(g(outside, PINKY_ONLY), Gesture::Idle);
        assert_eq!(g(inside, FIST), Gesture::Idle);
        assert_eq!(g(outside, FIST), Gesture::Idle);
    }

    #[test]
    fn test_colors_button_opens_panel() {
        let mut fx = Fixture::new();
        let at = center(&fx.layout.colors_button);

        let outcome = fx.frame(at, TWO_UP);
        assert_eq!(outcome.gesture, Some(Gesture::Select));
        assert!(fx.state.panels.colors);
        assert_eq!(fx.layout.colors_button.label, HIDE_LABEL);
        assert_eq!(fx.layout.colors_button.opacity, PRESSED_OPACITY);
        assert_eq!(
            outcome.events,
            vec![UiEvent::PanelToggled { panel: Panel::Colors, visible: true }]
        );
    }

    #[test]
    fn test_swatch_selects_color() {
        let mut fx = Fixture::new();
        fx.state.panels.colors = true;
        let swatch = fx.layout.color_swatches[1].clone();

        fx.frame(center(&swatch), TWO_UP);
        assert_eq!(fx.state.selected_color, swatch.fill);
        assert_eq!(fx.layout.color_swatches[1].opacity, PRESSED_OPACITY);
        for (i, sibling) in fx.layout.color_swatches.iter().enumerate() {
            if i != 1 {
                assert_eq!(sibling.opacity, DEFAULT_OPACITY);
            }
        }
    }

    #[test]
    fn test_hidden_panels_ignore_hits() {
        let mut fx = Fixture::new();
        let swatch = center(&fx.layout.color_swatches[2]);
        let size = center(&fx.layout.pen_sizes[3].control);

        fx.frame(swatch, TWO_UP);
        fx.frame(size, TWO_UP);
        assert_eq!(fx.state.selected_color, crate::interaction::state::DEFAULT_COLOR);
        assert_eq!(fx.state.brush_width, 5);
    }

    #[test]
    fn test_pen_size_selection() {
        let mut fx = Fixture::new();
        fx.state.panels.pen_sizes = true;
        let target = center(&fx.layout.pen_sizes[2].control);

        let outcome = fx.frame(target, INDEX_ONLY);
        assert_eq!(fx.state.brush_width, 15);
        assert_eq!(outcome.events, vec![UiEvent::BrushWidthSelected(15)]);
        assert!(fx.layout.pen_sizes[2].control.is_pressed());
        assert!(!fx.layout.pen_sizes[0].control.is_pressed());
    }

    #[test]
    fn test_clear_button_resets_canvas() {
        let mut fx = Fixture::new();
        fx.canvas.draw_segment((100, 200), (300, 400), 9, Rgb([255, 0, 0]));
        fx.state.panels.colors = true;

        let outcome = fx.frame(center(&fx.layout.clear_button), TWO_UP);
        assert!(fx.canvas.is_blank());
        assert_eq!(outcome.events, vec![UiEvent::CanvasCleared]);
    }

    #[test]
    fn test_cooldown_blocks_retrigger_for_nine_frames() {
        let mut fx = Fixture::new();
        let at = center(&fx.layout.board_button);

        fx.frame(at, TWO_UP);
        assert!(fx.state.panels.board);

        for i in 1..=9 {
            let outcome = fx.frame(at, TWO_UP);
            assert!(outcome.events.is_empty(), "retriggered on frame {i}");
            assert!(fx.state.panels.board);
            assert_eq!(fx.layout.board_button.opacity, DEFAULT_OPACITY);
        }

        fx.frame(at, TWO_UP);
        assert!(!fx.state.panels.board);
        assert_eq!(fx.layout.board_button.label, BOARD_LABEL);
    }

    #[test]
    fn test_cooldown_advances_without_hand() {
        let mut fx = Fixture::new();
        let at = center(&fx.layout.pen_button);
        fx.frame(at, TWO_UP);
        assert!(fx.state.panels.pen_sizes);

        for _ in 0..9 {
            fx.empty_frame();
        }
        fx.frame(at, TWO_UP);
        assert!(!fx.state.panels.pen_sizes);
        assert_eq!(fx.layout.pen_button.label, PEN_LABEL);
    }

    #[test]
    fn test_miss_changes_nothing() {
        let mut fx = Fixture::new();
        let before_state = fx.state.clone();
        let before_layout = fx.layout.clone();

        // Gap between the pen panel and the whiteboard
        let outcome = fx.frame((1085, 400), TWO_UP);
        assert_eq!(outcome.gesture, Some(Gesture::Select));
        assert!(outcome.events.is_empty());
        assert_eq!(fx.state, before_state);
        assert_eq!(fx.layout, before_layout);
        assert!(fx.state.cooldown.is_ready());
    }

    #[test]
    fn test_draw_requires_visible_board() {
        let mut fx = Fixture::new();
        fx.frame((100, 200), INDEX_ONLY);
        fx.frame((110, 200), INDEX_ONLY);
        assert!(fx.canvas.is_blank());

        fx.state.panels.board = true;
        let outcome = fx.frame((100, 200), INDEX_ONLY);
        assert_eq!(outcome.cursor, Some((100, 200)));
        fx.frame((110, 200), INDEX_ONLY);

        let color = crate::interaction::state::DEFAULT_COLOR;
        for x in 100..=110 {
            for y in 198..=202 {
                assert_eq!(fx.canvas.pixel(x, y), color);
            }
        }
        assert_eq!(fx.state.last_stroke_point, Some((110, 200)));
    }

    #[test]
    fn test_idle_breaks_stroke() {
        let mut fx = Fixture::new();
        fx.state.panels.board = true;

        fx.frame((200, 300), INDEX_ONLY);
        fx.frame((400, 300), TWO_UP);
        assert!(fx.state.last_stroke_point.is_none());
        fx.frame((600, 300), INDEX_ONLY);

        // No segment joins the two dots
        assert_eq!(fx.canvas.pixel(400, 300), INK_NONE);
        assert_ne!(fx.canvas.pixel(200, 300), INK_NONE);
        assert_ne!(fx.canvas.pixel(600, 300), INK_NONE);
    }

    #[test]
    fn test_fist_breaks_stroke() {
        let mut fx = Fixture::new();
        fx.state.panels.board = true;

        fx.frame((300, 300), INDEX_ONLY);
        let outcome = fx.frame((500, 300), FIST);
        assert_eq!(outcome.gesture, Some(Gesture::Idle));
        assert!(fx.state.last_stroke_point.is_none());
        fx.frame((700, 300), INDEX_ONLY);

        assert_eq!(fx.canvas.pixel(500, 300), INK_NONE);
        assert_ne!(fx.canvas.pixel(300, 300), INK_NONE);
        assert_ne!(fx.canvas.pixel(700, 300), INK_NONE);
    }

    #[test]
    fn test_no_hand_keeps_stroke_point() {
        let mut fx = Fixture::new();
        fx.state.panels.board = true;
        fx.frame((200, 300), INDEX_ONLY);
        fx.empty_frame();
        assert_eq!(fx.state.last_stroke_point, Some((200, 300)));
    }

    #[test]
    fn test_eraser_uses_eraser_width() {
        let mut fx = Fixture::new();
        fx.state.panels.board = true;
        fx.canvas.draw_segment((300, 300), (500, 300), 5, Rgb([255, 0, 0]));

        fx.state.selected_color = INK_NONE;
        fx.frame((300, 300), INDEX_ONLY);
        fx.frame((500, 300), INDEX_ONLY);
        assert!(fx.canvas.is_blank());
    }
}
