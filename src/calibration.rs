//! Screen calibration: viewing distance, pixel density and size correction
//!
//! Values are clamped when assigned, never rejected. Tests may only start
//! once the profile has been marked calibrated.

use crate::optotype::geometry::{jaeger_font_size, optotype_size, OptotypeSize};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_DISTANCE_M: f64 = 0.3;
pub const MAX_DISTANCE_M: f64 = 6.0;
pub const MIN_PX_PER_MM: f64 = 2.0;
pub const MAX_PX_PER_MM: f64 = 20.0;
pub const MIN_CORRECTION_FACTOR: f64 = 0.9;
pub const MAX_CORRECTION_FACTOR: f64 = 1.1;
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Raised when a test is requested before calibration was completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    NotCalibrated,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::NotCalibrated => write!(
                f,
                "screen is not calibrated (run `calibrate --complete` first)"
            ),
        }
    }
}

impl std::error::Error for CalibrationError {}

/// Persisted calibration state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationProfile {
    pub distance_m: f64,
    pub px_per_mm: f64,
    pub aspect_ratio: String,
    pub correction_factor: f64,
    pub calibrated: bool,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        CalibrationProfile {
            distance_m: 3.0,
            px_per_mm: 3.0,
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            correction_factor: 1.0,
            calibrated: false,
        }
    }
}

fn clamp(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl CalibrationProfile {
    pub fn set_distance(&mut self, distance_m: f64) {
        self.distance_m = clamp(distance_m, MIN_DISTANCE_M, MAX_DISTANCE_M, self.distance_m);
    }

    pub fn set_px_per_mm(&mut self, px_per_mm: f64) {
        self.px_per_mm = clamp(px_per_mm, MIN_PX_PER_MM, MAX_PX_PER_MM, self.px_per_mm);
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: &str) {
        self.aspect_ratio = aspect_ratio.to_string();
    }

    pub fn set_correction_factor(&mut self, factor: f64) {
        self.correction_factor = clamp(
            factor,
            MIN_CORRECTION_FACTOR,
            MAX_CORRECTION_FACTOR,
            self.correction_factor,
        );
    }

    /// Take pixel density and aspect ratio from a known screen
    pub fn apply_preset(&mut self, preset: &ScreenPreset) {
        self.set_px_per_mm(preset.px_per_mm);
        self.set_aspect_ratio(preset.aspect_ratio);
    }

    pub fn complete_calibration(&mut self) {
        self.calibrated = true;
    }

    /// Same profile with every numeric field forced into its bounds
    pub fn clamped(mut self) -> Self {
        let defaults = CalibrationProfile::default();
        self.distance_m = clamp(self.distance_m, MIN_DISTANCE_M, MAX_DISTANCE_M, defaults.distance_m);
        self.px_per_mm = clamp(self.px_per_mm, MIN_PX_PER_MM, MAX_PX_PER_MM, defaults.px_per_mm);
        self.correction_factor = clamp(
            self.correction_factor,
            MIN_CORRECTION_FACTOR,
            MAX_CORRECTION_FACTOR,
            defaults.correction_factor,
        );
        self
    }

    pub fn is_distance_valid(&self) -> bool {
        (MIN_DISTANCE_M..=MAX_DISTANCE_M).contains(&self.distance_m)
    }

    pub fn is_px_per_mm_valid(&self) -> bool {
        (MIN_PX_PER_MM..=MAX_PX_PER_MM).contains(&self.px_per_mm)
    }

    /// Sizing inputs regardless of the calibration gate
    pub fn sizing(&self) -> SizingContext {
        SizingContext::new(self.distance_m, self.px_per_mm, self.correction_factor)
    }

    /// Sizing inputs for a test screen; refuses when not calibrated
    pub fn require_calibrated(&self) -> Result<SizingContext, CalibrationError> {
        if !self.calibrated {
            return Err(CalibrationError::NotCalibrated);
        }
        Ok(self.sizing())
    }
}

/// Read-only view of the calibration used by the sizing math
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizingContext {
    distance_m: f64,
    px_per_mm: f64,
    correction_factor: f64,
}

impl SizingContext {
    pub fn new(distance_m: f64, px_per_mm: f64, correction_factor: f64) -> Self {
        SizingContext {
            distance_m,
            px_per_mm,
            correction_factor,
        }
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn px_per_mm(&self) -> f64 {
        self.px_per_mm
    }

    pub fn correction_factor(&self) -> f64 {
        self.correction_factor
    }

    /// Distance-chart optotype size at `log_mar`
    pub fn optotype_size(&self, log_mar: f64) -> OptotypeSize {
        optotype_size(self.distance_m, self.px_per_mm, log_mar, self.correction_factor)
    }

    /// Near-chart font size for a line of `point_size` points
    pub fn jaeger_font_size(&self, point_size: f64) -> f64 {
        jaeger_font_size(point_size, self.px_per_mm, self.correction_factor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetCategory {
    Tv,
    Monitor,
    Tablet,
    Phone,
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresetCategory::Tv => "tv",
            PresetCategory::Monitor => "monitor",
            PresetCategory::Tablet => "tablet",
            PresetCategory::Phone => "phone",
        };
        write!(f, "{}", name)
    }
}

/// Known screen with its measured pixel density
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPreset {
    pub label: &'static str,
    pub px_per_mm: f64,
    pub aspect_ratio: &'static str,
    pub category: PresetCategory,
}

const fn preset(
    label: &'static str,
    px_per_mm: f64,
    aspect_ratio: &'static str,
    category: PresetCategory,
) -> ScreenPreset {
    ScreenPreset {
        label,
        px_per_mm,
        aspect_ratio,
        category,
    }
}

pub static SCREEN_PRESETS: [ScreenPreset; 22] = [
    preset("32\" 1080p", 2.9, "16:9", PresetCategory::Tv),
    preset("40\" 1080p", 2.3, "16:9", PresetCategory::Tv),
    preset("43\" 4K", 4.2, "16:9", PresetCategory::Tv),
    preset("50\" 4K", 3.6, "16:9", PresetCategory::Tv),
    preset("55\" 4K", 3.1, "16:9", PresetCategory::Tv),
    preset("65\" 4K", 2.7, "16:9", PresetCategory::Tv),
    preset("75\" 4K", 2.3, "16:9", PresetCategory::Tv),
    preset("27\" Monitor 4K", 5.8, "16:9", PresetCategory::Monitor),
    preset("iPad Pro 12.9\"", 10.4, "4:3", PresetCategory::Tablet),
    preset("iPad Pro 11\"", 10.5, "4:3", PresetCategory::Tablet),
    preset("iPad 10.9\"", 10.4, "4:3", PresetCategory::Tablet),
    preset("iPad Mini", 10.8, "4:3", PresetCategory::Tablet),
    preset("Samsung Galaxy Tab S9+", 11.2, "16:10", PresetCategory::Tablet),
    preset("iPhone 15 Pro Max", 18.0, "19.5:9", PresetCategory::Phone),
    preset("iPhone 15 Pro", 18.1, "19.5:9", PresetCategory::Phone),
    preset("iPhone 14/15", 17.5, "19.5:9", PresetCategory::Phone),
    preset("iPhone 13/14 Pro", 18.0, "19.5:9", PresetCategory::Phone),
    preset("iPhone SE/Mini", 16.2, "19.5:9", PresetCategory::Phone),
    preset("Samsung Galaxy S24 Ultra", 17.2, "19.3:9", PresetCategory::Phone),
    preset("Samsung Galaxy S24/S23", 17.0, "19.5:9", PresetCategory::Phone),
    preset("Google Pixel 8 Pro", 16.8, "20:9", PresetCategory::Phone),
    preset("Google Pixel 8", 17.2, "20:9", PresetCategory::Phone),
];

/// Case-insensitive preset lookup by label
pub fn find_preset(label: &str) -> Option<&'static ScreenPreset> {
    let wanted = label.trim().to_lowercase();
    SCREEN_PRESETS
        .iter()
        .find(|p| p.label.to_lowercase() == wanted)
}
