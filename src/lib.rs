//! TV Visual Check - calibrated visual-acuity and color-vision screening
//!
//! The library holds the test logic: sizing math, symbol generation, line
//! ladders, the Ishihara walk and persisted settings. The terminal front
//! end lives in `cli` and the binaries.
//!
//! Results are a screening aid only, not a medical diagnosis.

pub mod action;
pub mod calibration;
pub mod cli;
pub mod logging;
pub mod optotype;
pub mod session;
pub mod settings;

pub use action::Action;
pub use calibration::{CalibrationError, CalibrationProfile, SizingContext};
pub use settings::{Settings, SettingsError, UiMode};
