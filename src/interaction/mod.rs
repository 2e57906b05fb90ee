//! Gesture interaction: state and per-frame dispatch

pub mod dispatcher;
pub mod state;

pub use dispatcher::{classify, dispatch, DispatchOutcome, Gesture, UiEvent};
pub use state::{Cooldown, InteractionState, Panel, PanelVisibility};
