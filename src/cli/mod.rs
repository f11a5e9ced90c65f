//! CLI Interface: User input, terminal rendering and display readiness
//!
//! # Components
//! - `input.rs`: Keystroke capture and normalization using crossterm
//! - `display.rs`: Terminal rendering and UI
//! - `readiness.rs`: Display readiness probe with timeout fallback
//! - `screens.rs`: Per-test key handling and frame building

pub mod display;
pub mod input;
pub mod readiness;
pub mod screens;

pub use display::Display;
pub use input::{InputHandler, ResetShortcut};
