//! On-screen controls and their layout

pub mod control;
pub mod font;
pub mod layout;

pub use control::{Control, DEFAULT_OPACITY, PRESSED_OPACITY};
pub use layout::{SizeOption, UiLayout};
