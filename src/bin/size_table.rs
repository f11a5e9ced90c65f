//! Size table for a screen setup
//!
//! Prints every acuity and Jaeger line with its physical and pixel size, for
//! checking a calibration with a ruler or exporting to a printed sheet.
//! Usage: size-table --distance 3 --px-per-mm 3.1 [--json]

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tv_visual_check::calibration::CalibrationProfile;
use tv_visual_check::optotype::geometry::is_size_viable;
use tv_visual_check::optotype::{ACUITY_LINES, JAEGER_LINES};
use tv_visual_check::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "size-table")]
#[command(about = "Print optotype sizes for every chart line")]
struct Args {
    /// Read calibration from this settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewing distance in meters (overrides the settings file)
    #[arg(long)]
    distance: Option<f64>,

    /// Pixels per millimeter (overrides the settings file)
    #[arg(long)]
    px_per_mm: Option<f64>,

    #[arg(long)]
    correction_factor: Option<f64>,

    /// Viewport height in px; marks lines that do not fit
    #[arg(long)]
    viewport_height: Option<f64>,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut profile = match &args.config {
        Some(path) => {
            Settings::load(path)
                .with_context(|| format!("loading {}", path.display()))?
                .settings
                .calibration
        }
        None => CalibrationProfile::default(),
    };
    if let Some(distance) = args.distance {
        profile.set_distance(distance);
    }
    if let Some(px_per_mm) = args.px_per_mm {
        profile.set_px_per_mm(px_per_mm);
    }
    if let Some(factor) = args.correction_factor {
        profile.set_correction_factor(factor);
    }

    let sizing = profile.sizing();
    let fits = |font_px: f64| {
        args.viewport_height
            .map(|h| is_size_viable(font_px, h).is_valid())
    };

    let acuity: Vec<_> = ACUITY_LINES
        .iter()
        .map(|line| {
            let size = sizing.optotype_size(line.log_mar);
            json!({
                "snellen": line.snellen,
                "log_mar": line.log_mar,
                "decimal_va": line.decimal_va,
                "height_mm": size.height_mm,
                "height_px": size.height_px,
                "font_px": size.font_size_px,
                "fits": fits(size.font_size_px),
            })
        })
        .collect();

    let jaeger: Vec<_> = JAEGER_LINES
        .iter()
        .map(|line| {
            let font_px = sizing.jaeger_font_size(line.point_size);
            json!({
                "jaeger": line.jaeger,
                "point_size": line.point_size,
                "snellen_near": line.snellen_near,
                "font_px": font_px,
                "fits": fits(font_px),
            })
        })
        .collect();

    if args.json {
        let doc = json!({
            "distance_m": sizing.distance_m(),
            "px_per_mm": sizing.px_per_mm(),
            "correction_factor": sizing.correction_factor(),
            "acuity": acuity,
            "jaeger": jaeger,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "Distance {:.2} m | {:.2} px/mm | correction {:.2}",
        sizing.distance_m(),
        sizing.px_per_mm(),
        sizing.correction_factor()
    );
    println!("{:<8} {:>6} {:>10} {:>10} {:>10}", "Line", "logMAR", "height mm", "height px", "font px");
    for line in ACUITY_LINES.iter() {
        let size = sizing.optotype_size(line.log_mar);
        let marker = match fits(size.font_size_px) {
            Some(false) => "  (does not fit)",
            _ => "",
        };
        println!(
            "{:<8} {:>6.1} {:>10.2} {:>10.1} {:>10.1}{}",
            line.snellen, line.log_mar, size.height_mm, size.height_px, size.font_size_px, marker
        );
    }

    println!();
    println!("{:<8} {:>6} {:>10}   (read at 40 cm)", "Jaeger", "pt", "font px");
    for line in JAEGER_LINES.iter() {
        println!(
            "{:<8} {:>6.1} {:>10.1}",
            line.jaeger,
            line.point_size,
            sizing.jaeger_font_size(line.point_size)
        );
    }
    Ok(())
}
