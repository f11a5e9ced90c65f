//! Optotype sizing: logMAR + viewing distance + pixel density → on-screen size
//!
//! A 20/20 (logMAR 0) optotype subtends 5 minutes of arc at the test
//! distance; every 1.0 logMAR multiplies that angle by 10.

use super::lines::{AcuityLine, ACUITY_LINES};

/// Rendered glyph height is smaller than the font size, so the font size is scaled up
pub const OPTOTYPE_FONT_SCALE: f64 = 1.75;

/// Millimeters per typographic point
pub const MM_PER_POINT: f64 = 0.3528;

/// Default lower bound for a legible font size (px)
pub const MIN_FONT_PX: f64 = 10.0;

/// Default upper bound as a fraction of the viewport height
pub const MAX_SCREEN_FRACTION: f64 = 0.8;

/// Approximate advance of one optotype including spacing, in font sizes
const CHAR_WIDTH_FACTOR: f64 = 1.2;

/// Derived size of one optotype; recomputed on demand
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptotypeSize {
    pub height_mm: f64,
    pub height_px: f64,
    pub font_size_px: f64,
}

/// Result of checking whether a font size can be shown on the current screen
#[derive(Clone, Debug, PartialEq)]
pub enum SizeCheck {
    Valid,
    Invalid { reason: &'static str },
}

impl SizeCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, SizeCheck::Valid)
    }
}

/// Angle subtended by a logMAR 0 optotype (5 arcmin) in radians
fn five_arcmin_rad() -> f64 {
    (5.0 / 60.0_f64).to_radians()
}

/// Optotype height in millimeters for the given distance and logMAR
pub fn optotype_height_mm(distance_m: f64, log_mar: f64) -> f64 {
    let angle = five_arcmin_rad() * 10f64.powf(log_mar);
    distance_m * angle.tan() * 1000.0
}

/// Full optotype size (mm, px, CSS-like font size) for a calibrated screen
pub fn optotype_size(
    distance_m: f64,
    px_per_mm: f64,
    log_mar: f64,
    correction_factor: f64,
) -> OptotypeSize {
    let height_mm = optotype_height_mm(distance_m, log_mar);
    let height_px = height_mm * px_per_mm;
    let font_size_px = height_px * OPTOTYPE_FONT_SCALE * correction_factor;

    OptotypeSize {
        height_mm,
        height_px,
        font_size_px,
    }
}

/// Size of the 20/20 reference line
pub fn base_optotype_size(distance_m: f64, px_per_mm: f64, correction_factor: f64) -> OptotypeSize {
    optotype_size(distance_m, px_per_mm, 0.0, correction_factor)
}

/// Check a font size against the renderable range of a viewport
pub fn check_size(
    font_size_px: f64,
    viewport_height_px: f64,
    min_font_px: f64,
    max_fraction: f64,
) -> SizeCheck {
    if font_size_px < min_font_px {
        return SizeCheck::Invalid {
            reason: "too small to render",
        };
    }

    if font_size_px > viewport_height_px * max_fraction {
        return SizeCheck::Invalid {
            reason: "exceeds screen height",
        };
    }

    SizeCheck::Valid
}

/// `check_size` with the default bounds (10 px, 80% of the viewport)
pub fn is_size_viable(font_size_px: f64, viewport_height_px: f64) -> SizeCheck {
    check_size(
        font_size_px,
        viewport_height_px,
        MIN_FONT_PX,
        MAX_SCREEN_FRACTION,
    )
}

/// Font size in pixels for a Jaeger line of `point_size` points
pub fn jaeger_font_size(point_size: f64, px_per_mm: f64, correction_factor: f64) -> f64 {
    point_size * MM_PER_POINT * px_per_mm * correction_factor
}

/// How many optotypes fit across `available_width_px`, clamped to `[min_chars, max_chars]`
pub fn calculate_chars_per_line(
    available_width_px: f64,
    font_size_px: f64,
    min_chars: usize,
    max_chars: usize,
) -> usize {
    let char_width = font_size_px * CHAR_WIDTH_FACTOR;
    let max_possible = if char_width > 0.0 {
        (available_width_px / char_width).floor().max(0.0) as usize
    } else {
        max_chars
    };
    max_possible.min(max_chars).max(min_chars)
}

/// Nearest table line to an arbitrary logMAR; the first line wins on equal distance
pub fn find_closest_acuity_line(log_mar: f64) -> &'static AcuityLine {
    let mut closest = &ACUITY_LINES[0];
    let mut min_diff = (log_mar - closest.log_mar).abs();

    for line in ACUITY_LINES.iter() {
        let diff = (log_mar - line.log_mar).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = line;
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_height_at_three_meters() {
        let h = optotype_height_mm(3.0, 0.0);
        assert!((h - 4.36).abs() < 0.1, "got {h}");

        let h10 = optotype_height_mm(3.0, 1.0);
        assert!((h10 - 43.6).abs() < 1.0, "got {h10}");
    }

    #[test]
    fn test_height_scales_with_distance() {
        let near = optotype_height_mm(3.0, 0.0);
        let far = optotype_height_mm(6.0, 0.0);
        assert!(far > near);
        assert!((far / near - 2.0).abs() < 0.1);
        assert!((far - 8.72).abs() < 8.72 * 0.05);

        let mut prev = 0.0;
        for step in 1..=20 {
            let h = optotype_height_mm(step as f64 * 0.3, 0.3);
            assert!(h > prev);
            prev = h;
        }
    }

    #[test]
    fn test_height_monotonic_in_log_mar() {
        let mut prev = 0.0;
        for line in ACUITY_LINES.iter().rev() {
            let h = optotype_height_mm(4.0, line.log_mar);
            assert!(h > prev);
            prev = h;
        }
    }

    #[test]
    fn test_font_size_linear_in_correction_and_density() {
        let base = optotype_size(3.0, 4.0, 0.3, 1.0);
        let corrected = optotype_size(3.0, 4.0, 0.3, 1.1);
        assert!((corrected.font_size_px / base.font_size_px - 1.1).abs() < 1e-9);

        let dense = optotype_size(3.0, 8.0, 0.3, 1.0);
        assert!((dense.height_px / base.height_px - 2.0).abs() < 1e-9);
        assert!((base.font_size_px - base.height_px * OPTOTYPE_FONT_SCALE).abs() < 1e-9);
    }

    #[test]
    fn test_base_size_is_log_mar_zero() {
        assert_eq!(
            base_optotype_size(2.5, 3.1, 1.05),
            optotype_size(2.5, 3.1, 0.0, 1.05)
        );
    }

    #[test]
    fn test_size_viability() {
        assert_eq!(
            is_size_viable(5.0, 1080.0),
            SizeCheck::Invalid {
                reason: "too small to render"
            }
        );
        assert_eq!(
            is_size_viable(900.0, 1080.0),
            SizeCheck::Invalid {
                reason: "exceeds screen height"
            }
        );
        assert!(is_size_viable(100.0, 1080.0).is_valid());
        assert!(check_size(10.0, 100.0, 10.0, 0.8).is_valid());
    }

    #[test]
    fn test_chars_per_line_clamped() {
        assert_eq!(calculate_chars_per_line(100.0, 50.0, 3, 5), 3);
        assert_eq!(calculate_chars_per_line(10_000.0, 10.0, 3, 5), 5);
        assert_eq!(calculate_chars_per_line(240.0, 50.0, 3, 5), 4);
        assert_eq!(calculate_chars_per_line(500.0, 0.0, 3, 5), 5);
    }

    #[test]
    fn test_closest_line() {
        assert_eq!(find_closest_acuity_line(0.0).snellen, "20/20");
        let mid = find_closest_acuity_line(0.25);
        assert!(mid.log_mar == 0.2 || mid.log_mar == 0.3);
        assert_eq!(find_closest_acuity_line(5.0).snellen, "20/400");
        assert_eq!(find_closest_acuity_line(-2.0).snellen, "20/10");
    }

    #[test]
    fn test_jaeger_font_size() {
        let px = jaeger_font_size(10.0, 4.0, 1.0);
        assert!((px - 14.112).abs() < 1e-9);
        let corrected = jaeger_font_size(10.0, 4.0, 0.9);
        assert!((corrected / px - 0.9).abs() < 1e-9);
    }
}
