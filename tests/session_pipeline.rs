//! End-to-end interaction scenarios through `Session::process`

use std::collections::VecDeque;

use gesture_board::interaction::state::DEFAULT_COLOR;
use gesture_board::ui::layout::{BOARD_LABEL, COLORS_LABEL, HIDE_LABEL};
use gesture_board::ui::{DEFAULT_OPACITY, PRESSED_OPACITY};
use gesture_board::{
    AppConfig, Control, DetectError, Gesture, HandDetector, HandObservation, Session, UiEvent, UiLayout,
    INK_NONE,
};
use image::{Rgb, RgbImage};

const INDEX_ONLY: [bool; 5] = [false, true, false, false, false];
const TWO_UP: [bool; 5] = [false, true, true, false, false];

/// Replays one observation per frame, then reports no hand
struct ScriptedDetector {
    script: VecDeque<Option<HandObservation>>,
}

impl HandDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Option<HandObservation>, DetectError> {
        Ok(self.script.pop_front().flatten())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn layout() -> UiLayout {
    UiLayout::standard(Rgb([10, 200, 90]))
}

fn center(control: &Control) -> (i32, i32) {
    ((control.x + control.width / 2) as i32, (control.y + control.height / 2) as i32)
}

fn session(script: Vec<Option<HandObservation>>) -> Session {
    let detector = ScriptedDetector {
        script: script.into_iter().collect(),
    };
    Session::with_layout(&AppConfig::default(), layout(), Box::new(detector)).unwrap()
}

fn at(pointer: (i32, i32), fingers: [bool; 5]) -> Option<HandObservation> {
    Some(HandObservation::pointing(pointer, fingers))
}

fn camera_frame() -> RgbImage {
    RgbImage::from_fn(1280, 720, |x, _| if x < 640 { Rgb([200, 0, 0]) } else { Rgb([0, 0, 200]) })
}

fn run(session: &mut Session, frames: usize) -> Vec<gesture_board::ProcessedFrame> {
    (0..frames).map(|_| session.process(camera_frame())).collect()
}

#[test]
fn test_no_hand_passes_frame_through() {
    let mut s = session(vec![]);
    let out = s.process(camera_frame());

    assert!(!out.hand_detected);
    assert_eq!(out.outcome.gesture, None);
    // Mirrored: output column 1080 comes from input column 199
    assert_eq!(*out.image.get_pixel(1080, 710), Rgb([200, 0, 0]));
    assert_eq!(*out.image.get_pixel(100, 710), Rgb([0, 0, 200]));
    assert!(s.canvas().is_blank());
}

#[test]
fn test_open_colors_then_pick_swatch() {
    let l = layout();
    let mut s = session(vec![
        at(center(&l.colors_button), TWO_UP),
        at(center(&l.color_swatches[3]), TWO_UP),
    ]);

    let first = s.process(camera_frame());
    assert_eq!(first.outcome.gesture, Some(Gesture::Select));
    assert!(s.state().panels.colors);
    assert_eq!(s.layout().colors_button.label, HIDE_LABEL);
    assert_eq!(s.state().selected_color, DEFAULT_COLOR);

    let second = s.process(camera_frame());
    assert_eq!(second.outcome.events, vec![UiEvent::ColorSelected(Rgb([0, 255, 0]))]);
    assert_eq!(s.state().selected_color, Rgb([0, 255, 0]));
    for (i, swatch) in s.layout().color_swatches.iter().enumerate() {
        let expected = if i == 3 { PRESSED_OPACITY } else { DEFAULT_OPACITY };
        assert_eq!(swatch.opacity, expected, "swatch {i}");
    }
}

#[test]
fn test_toggle_twice_restores_label() {
    let l = layout();
    let board = center(&l.board_button);
    let mut script = vec![at(board, TWO_UP)];
    // Lift the hand for the cooldown, then hit again
    script.extend((0..9).map(|_| None));
    script.push(at(board, TWO_UP));
    let mut s = session(script);

    run(&mut s, 1);
    assert!(s.state().panels.board);
    assert_eq!(s.layout().board_button.label, HIDE_LABEL);

    run(&mut s, 10);
    assert!(!s.state().panels.board);
    assert_eq!(s.layout().board_button.label, BOARD_LABEL);
    assert_eq!(s.layout().colors_button.label, COLORS_LABEL);
}

#[test]
fn test_held_toggle_respects_cooldown() {
    let l = layout();
    let colors = center(&l.colors_button);
    let mut s = session((0..11).map(|_| at(colors, TWO_UP)).collect());

    let outputs = run(&mut s, 11);
    let toggles: Vec<usize> = outputs
        .iter()
        .enumerate()
        .filter(|(_, o)| o.outcome.events.iter().any(|e| matches!(e, UiEvent::PanelToggled { .. })))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(toggles, vec![0, 10]);
    assert!(!s.state().panels.colors);
}

#[test]
fn test_drawn_stroke_shows_on_board() {
    let l = layout();
    let mut s = session(vec![
        at(center(&l.board_button), TWO_UP),
        at((400, 300), INDEX_ONLY),
        at((500, 300), INDEX_ONLY),
    ]);

    let outputs = run(&mut s, 3);
    assert!(s.state().panels.board);
    assert_eq!(outputs[2].outcome.gesture, Some(Gesture::Draw));
    assert_eq!(outputs[2].outcome.cursor, Some((500, 300)));

    for x in [400, 450, 500] {
        assert_eq!(s.canvas().pixel(x, 300), DEFAULT_COLOR);
        assert_eq!(*outputs[2].image.get_pixel(x, 300), DEFAULT_COLOR);
    }
    // Width 5: two pixels either side of the centre line
    assert_eq!(s.canvas().pixel(450, 302), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(450, 304), INK_NONE);
}

#[test]
fn test_hidden_board_blocks_drawing() {
    let mut s = session(vec![at((400, 300), INDEX_ONLY), at((500, 300), INDEX_ONLY)]);
    let outputs = run(&mut s, 2);

    assert!(s.canvas().is_blank());
    assert_eq!(outputs[1].outcome.cursor, None);
    assert_eq!(s.state().last_stroke_point, None);
}

#[test]
fn test_hidden_board_hides_existing_ink() {
    let l = layout();
    let board = center(&l.board_button);
    let mut script = vec![at(board, TWO_UP), at((400, 300), INDEX_ONLY)];
    script.extend((0..9).map(|_| None));
    script.push(at(board, TWO_UP));
    let mut s = session(script);

    let outputs = run(&mut s, 12);
    assert!(!s.state().panels.board);
    assert!(!s.canvas().is_blank());
    // Ink persists in the canvas but the live frame shows through
    assert_eq!(*outputs[11].image.get_pixel(400, 300), Rgb([0, 0, 200]));
}

/// Hit `control` and wait out the toggle cooldown with the hand lifted
fn toggle(script: &mut Vec<Option<HandObservation>>, control: &Control) {
    script.push(at(center(control), TWO_UP));
    script.extend((0..9).map(|_| None));
}

#[test]
fn test_erase_then_clear() {
    let l = layout();
    let mut script = Vec::new();
    toggle(&mut script, &l.board_button);
    toggle(&mut script, &l.colors_button);
    script.extend([
        at((300, 400), INDEX_ONLY),
        at((600, 400), INDEX_ONLY),
        at((450, 500), TWO_UP),
        at((300, 600), INDEX_ONLY),
        at((600, 600), INDEX_ONLY),
        at(center(&l.color_swatches[5]), TWO_UP),
        at((300, 400), INDEX_ONLY),
        at((600, 400), INDEX_ONLY),
        at(center(&l.clear_button), TWO_UP),
    ]);
    let mut s = session(script);

    run(&mut s, 25);
    assert!(s.state().panels.board && s.state().panels.colors);
    assert_eq!(s.canvas().pixel(450, 400), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(450, 600), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(450, 500), INK_NONE);

    run(&mut s, 3);
    assert_eq!(s.state().selected_color, INK_NONE);
    for y in 395..=405 {
        assert_eq!(s.canvas().pixel(450, y), INK_NONE);
    }
    assert_eq!(s.canvas().pixel(450, 600), DEFAULT_COLOR);

    run(&mut s, 1);
    assert!(s.canvas().is_blank());
}

#[test]
fn test_select_between_strokes_starts_new_stroke() {
    let l = layout();
    let mut s = session(vec![
        at(center(&l.board_button), TWO_UP),
        at((300, 300), INDEX_ONLY),
        at((1085, 300), INDEX_ONLY),
        at((700, 300), INDEX_ONLY),
    ]);

    run(&mut s, 4);
    assert_eq!(s.canvas().pixel(300, 300), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(700, 300), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(500, 300), INK_NONE);
}

#[test]
fn test_fist_between_strokes_starts_new_stroke() {
    let l = layout();
    let mut s = session(vec![
        at(center(&l.board_button), TWO_UP),
        at((300, 300), INDEX_ONLY),
        at((500, 300), [false; 5]),
        at((700, 300), INDEX_ONLY),
    ]);

    let outputs = run(&mut s, 4);
    assert_eq!(outputs[2].outcome.gesture, Some(Gesture::Idle));
    assert_eq!(s.canvas().pixel(300, 300), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(700, 300), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(500, 300), INK_NONE);
}

#[test]
fn test_pen_size_changes_stroke_width() {
    let l = layout();
    let mut script = Vec::new();
    toggle(&mut script, &l.board_button);
    toggle(&mut script, &l.pen_button);
    script.extend([
        at(center(&l.pen_sizes[3].control), TWO_UP),
        at((400, 500), INDEX_ONLY),
        at((600, 500), INDEX_ONLY),
    ]);
    let mut s = session(script);

    run(&mut s, 23);
    assert_eq!(s.state().brush_width, 20);
    assert_eq!(s.canvas().pixel(500, 509), DEFAULT_COLOR);
    assert_eq!(s.canvas().pixel(500, 511), INK_NONE);
}
