//! TV Visual Check - calibrated visual-acuity and color-vision screening
//!
//! Terminal front end: calibration, presets, sizing lookups, interactive
//! tests and examiner charts. Settings persist in a JSON file.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tv_visual_check::action::Action;
use tv_visual_check::calibration::{find_preset, CalibrationProfile, SCREEN_PRESETS};
use tv_visual_check::cli::display::{Frame, Stimulus};
use tv_visual_check::cli::input::normalize_key;
use tv_visual_check::cli::readiness::{probe_with_timeout, terminal_probe, Readiness, READINESS_TIMEOUT};
use tv_visual_check::cli::screens::{
    shell_key, DirectionalScreen, IshiharaScreen, JaegerScreen, LetterScreen, Screen, ScreenContext,
    ShellKey,
};
use tv_visual_check::cli::{Display, InputHandler, ResetShortcut};
use tv_visual_check::logging::Logger;
use tv_visual_check::optotype::geometry::{
    base_optotype_size, calculate_chars_per_line, find_closest_acuity_line, is_size_viable,
};
use tv_visual_check::optotype::{OptotypePool, TextLocale};
use tv_visual_check::session::jaeger::JAEGER_DEFAULT_CONFIG;
use tv_visual_check::session::{
    AcuityChart, ChartCommand, ChartOptotype, ChartTheme, DirectionalOptotype, DirectionalTest,
    IshiharaTest, JaegerChart, JaegerTest, LadderConfig, LetterTest, TestPhase,
};
use tv_visual_check::settings::{ui_mode_context, LoadSource, Settings, UiMode, UiModeReader, UiModeWriter};

#[derive(Parser, Debug)]
#[command(name = "tv-visual-check")]
#[command(about = "Calibrated visual-acuity and color-vision screening (not a medical diagnosis)")]
struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = "tv-visual-check.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Append JSON-lines events to this file
    #[arg(long, global = true)]
    log_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Set viewing distance, pixel density and display options
    Calibrate(CalibrateArgs),
    /// List known screen presets
    Presets,
    /// Print the on-screen size of an optotype
    Size(SizeArgs),
    /// Run an interactive test
    Test(TestArgs),
    /// Open an examiner chart (free navigation, no scoring)
    Chart(ChartArgs),
    /// Restore default calibration
    Reset {
        /// Also clear the UI-mode override and test history
        #[arg(long)]
        full: bool,
    },
}

#[derive(Args, Debug)]
struct CalibrateArgs {
    /// Viewing distance in meters
    #[arg(long)]
    distance: Option<f64>,

    /// Pixels per millimeter
    #[arg(long)]
    px_per_mm: Option<f64>,

    /// Apply a screen preset by label (see `presets`)
    #[arg(long)]
    preset: Option<String>,

    #[arg(long)]
    aspect_ratio: Option<String>,

    /// Fine size correction (0.9 - 1.1)
    #[arg(long)]
    correction_factor: Option<f64>,

    #[arg(long, value_enum)]
    ui_mode: Option<UiModeArg>,

    #[arg(long)]
    high_contrast: Option<bool>,

    /// Mark the screen as calibrated so tests can start
    #[arg(long)]
    complete: bool,
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// logMAR value (negative values allowed)
    #[arg(long, allow_hyphen_values = true, default_value = "0")]
    log_mar: f64,

    /// Viewport height in px, to check the size fits
    #[arg(long)]
    viewport_height: Option<f64>,

    /// Viewport width in px, to compute symbols per line
    #[arg(long)]
    viewport_width: Option<f64>,
}

#[derive(Args, Debug)]
struct TestArgs {
    #[arg(value_enum)]
    kind: TestKind,

    /// Reading passage language for the Jaeger test (en, pt)
    #[arg(long, default_value = "en")]
    locale: String,

    /// Use only the first N Ishihara plates
    #[arg(long)]
    plates: Option<usize>,

    /// Seed for a reproducible symbol stream
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[arg(value_enum)]
    kind: ChartKind,

    /// Symbols on the acuity chart
    #[arg(long, value_enum, default_value = "letters")]
    optotype: ChartOptotypeArg,

    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TestKind {
    Letters,
    Pediatric,
    TumblingE,
    Landolt,
    Jaeger,
    Ishihara,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ChartKind {
    Acuity,
    Jaeger,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ChartOptotypeArg {
    Letters,
    Pediatric,
    TumblingE,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum UiModeArg {
    Auto,
    Tv,
    Desktop,
    Touch,
}

impl UiModeArg {
    fn to_override(self) -> Option<UiMode> {
        match self {
            UiModeArg::Auto => None,
            UiModeArg::Tv => Some(UiMode::Tv),
            UiModeArg::Desktop => Some(UiMode::Desktop),
            UiModeArg::Touch => Some(UiMode::Touch),
        }
    }
}

/// Everything a command needs besides its own arguments
struct App {
    config: PathBuf,
    settings: Settings,
    logger: Logger,
    ui_writer: UiModeWriter,
    ui: UiModeReader,
}

impl App {
    fn save(&mut self) -> Result<()> {
        self.settings
            .save(&self.config)
            .with_context(|| format!("saving {}", self.config.display()))?;
        self.logger
            .debug(format!("settings saved to {}", self.config.display()));
        Ok(())
    }

    fn theme(&self) -> ChartTheme {
        if self.settings.high_contrast {
            ChartTheme::Night
        } else {
            ChartTheme::Day
        }
    }
}

enum RunOutcome {
    Quit,
    CalibrationReset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = Logger::from_env(cli.log_json.clone(), cli.debug).context("opening JSON log")?;

    let loaded = Settings::load(&cli.config)?;
    match loaded.source {
        LoadSource::Defaults => logger.debug(format!(
            "no settings at {}, using defaults",
            cli.config.display()
        )),
        LoadSource::Current => logger.debug(format!("settings loaded from {}", cli.config.display())),
        LoadSource::Migrated { from } => logger.info(format!(
            "settings migrated from schema {} to {}",
            from, loaded.settings.schema_version
        )),
    }

    let columns = crossterm::terminal::size().map(|(c, _)| c).unwrap_or(80);
    let (ui_writer, ui) = ui_mode_context(UiMode::detect(columns), loaded.settings.ui_mode_override);

    let mut app = App {
        config: cli.config,
        settings: loaded.settings,
        logger,
        ui_writer,
        ui,
    };

    match cli.command {
        Command::Calibrate(args) => calibrate(&mut app, args),
        Command::Presets => {
            list_presets();
            Ok(())
        }
        Command::Size(args) => size(&app, args),
        Command::Test(args) => run_test(&mut app, args),
        Command::Chart(args) => run_chart(&mut app, args),
        Command::Reset { full } => {
            if full {
                app.settings.full_reset();
            } else {
                app.settings.reset();
            }
            app.ui_writer.sync(&app.settings);
            app.save()?;
            app.logger.info(if full {
                "All settings restored to defaults"
            } else {
                "Calibration restored to defaults"
            });
            Ok(())
        }
    }
}

fn calibrate(app: &mut App, args: CalibrateArgs) -> Result<()> {
    let profile = &mut app.settings.calibration;

    if let Some(label) = &args.preset {
        let Some(preset) = find_preset(label) else {
            bail!("unknown preset '{}' (run `presets` for the list)", label);
        };
        profile.apply_preset(preset);
    }
    if let Some(distance) = args.distance {
        profile.set_distance(distance);
    }
    if let Some(px_per_mm) = args.px_per_mm {
        profile.set_px_per_mm(px_per_mm);
    }
    if let Some(aspect) = &args.aspect_ratio {
        profile.set_aspect_ratio(aspect);
    }
    if let Some(factor) = args.correction_factor {
        profile.set_correction_factor(factor);
    }
    if args.complete {
        profile.complete_calibration();
    }
    if let Some(mode) = args.ui_mode {
        app.settings.ui_mode_override = mode.to_override();
        app.ui_writer.sync(&app.settings);
    }
    if let Some(high_contrast) = args.high_contrast {
        app.settings.high_contrast = high_contrast;
    }

    app.save()?;
    print_profile(&app.settings.calibration, &app.ui);
    Ok(())
}

fn print_profile(profile: &CalibrationProfile, ui: &UiModeReader) {
    println!("Distance:          {:.2} m", profile.distance_m);
    println!("Pixel density:     {:.2} px/mm", profile.px_per_mm);
    println!("Aspect ratio:      {}", profile.aspect_ratio);
    println!("Correction factor: {:.2}", profile.correction_factor);
    println!("UI mode:           {} (margin {} px)", ui.mode(), ui.safe_margin());
    println!(
        "Calibrated:        {}",
        if profile.calibrated { "yes" } else { "no (add --complete)" }
    );

    let base = profile.sizing().optotype_size(0.0);
    println!(
        "20/20 optotype:    {:.2} mm, {:.1} px",
        base.height_mm, base.height_px
    );
}

fn list_presets() {
    for preset in SCREEN_PRESETS.iter() {
        println!(
            "{:<8} {:<26} {:>5.1} px/mm  {}",
            preset.category.to_string(),
            preset.label,
            preset.px_per_mm,
            preset.aspect_ratio
        );
    }
}

fn size(app: &App, args: SizeArgs) -> Result<()> {
    let profile = &app.settings.calibration;
    if !profile.calibrated {
        eprintln!("warning: screen is not calibrated, sizes use the current values");
    }

    let sizing = profile.sizing();
    let size = sizing.optotype_size(args.log_mar);
    let line = find_closest_acuity_line(args.log_mar);
    let base = base_optotype_size(sizing.distance_m(), sizing.px_per_mm(), sizing.correction_factor());

    println!(
        "logMAR {:.2} (closest line {}, decimal {:.2}) at {:.2} m",
        args.log_mar, line.snellen, line.decimal_va, sizing.distance_m()
    );
    println!(
        "height {:.2} mm | {:.1} px | font {:.1} px",
        size.height_mm, size.height_px, size.font_size_px
    );
    println!("logMAR 0 reference: font {:.1} px", base.font_size_px);

    if let Some(height) = args.viewport_height {
        let check = is_size_viable(size.font_size_px, height);
        println!("fits {:.0} px viewport: {:?}", height, check);
    }
    if let Some(width) = args.viewport_width {
        let usable = width - 2.0 * app.ui.safe_margin() as f64;
        println!(
            "symbols per line: {}",
            calculate_chars_per_line(usable, size.font_size_px, 3, 5)
        );
    }
    Ok(())
}

fn run_test(app: &mut App, args: TestArgs) -> Result<()> {
    let sizing = app.settings.calibration.require_calibrated()?;

    let seeded_letters = |pool| match args.seed {
        Some(seed) => LetterTest::with_seed(pool, LadderConfig::default(), seed),
        None => LetterTest::new(pool, LadderConfig::default()),
    };
    let seeded_directional = |optotype| match args.seed {
        Some(seed) => DirectionalTest::with_seed(optotype, LadderConfig::default(), seed),
        None => DirectionalTest::new(optotype, LadderConfig::default()),
    };
    let locale = TextLocale::from_tag(&args.locale);

    let mut screen: Box<dyn Screen> = match args.kind {
        TestKind::Letters => Box::new(LetterScreen::new(seeded_letters(OptotypePool::Snellen))),
        TestKind::Pediatric => Box::new(LetterScreen::new(seeded_letters(OptotypePool::Pediatric))),
        TestKind::TumblingE => Box::new(DirectionalScreen::new(seeded_directional(
            DirectionalOptotype::TumblingE,
        ))),
        TestKind::Landolt => Box::new(DirectionalScreen::new(seeded_directional(
            DirectionalOptotype::LandoltRing,
        ))),
        TestKind::Jaeger => Box::new(JaegerScreen::new(match args.seed {
            Some(seed) => JaegerTest::with_seed(locale, JAEGER_DEFAULT_CONFIG, seed),
            None => JaegerTest::new(locale, JAEGER_DEFAULT_CONFIG),
        })),
        TestKind::Ishihara => Box::new(IshiharaScreen::new(IshiharaTest::new(args.plates))),
    };

    check_display(&mut app.logger);

    let theme = app.theme();
    let ctx = move |ui: &UiModeReader| ScreenContext {
        sizing,
        margin_px: ui.safe_margin(),
        theme,
    };

    app.logger.info(format!("{} ready", screen.title()));

    // Display owns raw-mode cleanup on drop
    let display = Display::interactive().context("entering alternate screen")?;
    InputHandler::enable_raw_mode().context("enabling raw mode")?;
    app.logger.set_console_muted(true);

    let outcome = test_loop(app, screen.as_mut(), &display, ctx);

    drop(display);
    app.logger.set_console_muted(false);

    match outcome? {
        RunOutcome::Quit => {
            if screen.phase() == TestPhase::Finished {
                app.logger.info(screen.summary_line());
            }
        }
        RunOutcome::CalibrationReset => {
            app.logger
                .warn("Calibration reset; run `calibrate --complete` before the next test");
        }
    }
    Ok(())
}

fn check_display(logger: &mut Logger) {
    match probe_with_timeout(terminal_probe, READINESS_TIMEOUT) {
        Readiness::Ready => logger.debug("display ready"),
        Readiness::Fallback { reason } => {
            logger.warn(format!("display check: {}; continuing with plain rendering", reason))
        }
    }
}

fn reset_prompt(display: &Display) -> std::io::Result<()> {
    display.clear()?;
    display.show_message("Reset calibration to defaults? (y/n)")
}

fn test_loop(
    app: &mut App,
    screen: &mut dyn Screen,
    display: &Display,
    ctx: impl Fn(&UiModeReader) -> ScreenContext,
) -> Result<RunOutcome> {
    let input = InputHandler::new();
    let mut shortcut = ResetShortcut::new();
    let mut confirm_reset = false;
    let mut last_phase = screen.phase();
    let mut dirty = true;

    loop {
        if screen.tick(Instant::now()) {
            dirty = true;
        }

        let phase = screen.phase();
        if phase != last_phase {
            if phase == TestPhase::Finished {
                app.logger.info(screen.summary_line());
            }
            last_phase = phase;
            dirty = true;
        }

        if dirty {
            let ctx = ctx(&app.ui);
            if confirm_reset {
                reset_prompt(display)?;
            } else {
                draw(display, screen, &ctx)?;
            }
            dirty = false;
        }

        let Some(key) = input.read_key()? else {
            continue;
        };
        let now = Instant::now();
        dirty = true;

        if InputHandler::is_exit(&key) {
            return Ok(RunOutcome::Quit);
        }

        if confirm_reset {
            confirm_reset = false;
            if InputHandler::key_to_char(&key).map(|c| c.to_ascii_lowercase()) == Some('y') {
                app.settings.reset();
                app.save()?;
                return Ok(RunOutcome::CalibrationReset);
            }
            continue;
        }

        let action = normalize_key(&key);
        if action.is_navigation() {
            app.ui.promote_to_tv();
        }

        let typing = screen.phase() == TestPhase::Testing && screen.text_entry();
        if !typing && shortcut.observe(&key, now) {
            confirm_reset = true;
            continue;
        }

        match screen.phase() {
            TestPhase::Ready => match shell_key(&key) {
                ShellKey::Start => {
                    screen.start();
                    app.logger.debug(format!("{} started", screen.title()));
                }
                ShellKey::Quit => return Ok(RunOutcome::Quit),
                ShellKey::Back | ShellKey::Other => {}
            },
            TestPhase::Testing => {
                let back = key.code == crossterm::event::KeyCode::Esc
                    || (action == Action::Back && !screen.text_entry());
                if back {
                    screen.restart();
                    app.logger.info(format!("{} restarted", screen.title()));
                } else {
                    screen.handle_key(&key, now);
                }
            }
            TestPhase::Finished => match shell_key(&key) {
                ShellKey::Start => screen.restart(),
                ShellKey::Quit => return Ok(RunOutcome::Quit),
                ShellKey::Back | ShellKey::Other => {}
            },
        }
    }
}

fn draw(display: &Display, screen: &dyn Screen, ctx: &ScreenContext) -> std::io::Result<()> {
    match screen.phase() {
        TestPhase::Ready => display.render(&Frame {
            title: screen.title(),
            line_label: None,
            stimulus: Stimulus::Text("Press Enter to begin"),
            size: None,
            progress: None,
            feedback: None,
            hint: "Enter start  |  r reset calibration  |  q quit",
            theme: ctx.theme,
            margin_px: ctx.margin_px,
        }),
        TestPhase::Testing => display.render(&screen.frame(ctx)),
        TestPhase::Finished => {
            display.clear()?;
            screen.show_summary(display)?;
            display.show_message("Enter run again  |  q quit")
        }
    }
}

enum ChartScreen {
    Acuity(AcuityChart),
    Jaeger(JaegerChart),
}

impl ChartScreen {
    fn handle_action(&mut self, action: Action) -> ChartCommand {
        match self {
            ChartScreen::Acuity(chart) => chart.handle_action(action),
            ChartScreen::Jaeger(chart) => chart.handle_action(action),
        }
    }

    fn toggle_theme(&mut self) {
        match self {
            ChartScreen::Acuity(chart) => chart.toggle_theme(),
            ChartScreen::Jaeger(chart) => chart.toggle_theme(),
        }
    }

    fn go_to_line(&mut self, index: usize) -> bool {
        match self {
            ChartScreen::Acuity(chart) => chart.go_to_line(index),
            ChartScreen::Jaeger(chart) => chart.go_to_line(index),
        }
    }

    fn render(&self, display: &Display, ctx: &ScreenContext) -> std::io::Result<()> {
        let hint = "↑↓ line  |  → shuffle  |  0-9 jump  |  t theme  |  ← / Esc exit";
        match self {
            ChartScreen::Acuity(chart) => {
                let stimulus = if chart.directions().is_empty() {
                    Stimulus::Symbols(chart.symbols())
                } else {
                    Stimulus::Directions(chart.directions())
                };
                let line = chart.current_line();
                display.render(&Frame {
                    title: "Acuity chart",
                    line_label: Some(format!(
                        "{}  (logMAR {:.1}, decimal {:.2})",
                        line.snellen, line.log_mar, line.decimal_va
                    )),
                    stimulus,
                    size: Some(chart.optotype_size(&ctx.sizing)),
                    progress: None,
                    feedback: None,
                    hint,
                    theme: chart.theme(),
                    margin_px: ctx.margin_px,
                })
            }
            ChartScreen::Jaeger(chart) => {
                let line = chart.current_line();
                display.render(&Frame {
                    title: "Jaeger chart",
                    line_label: Some(format!(
                        "{} ({} pt)  |  font {:.1} px at {} cm",
                        line.jaeger,
                        line.point_size,
                        chart.font_size_px(&ctx.sizing),
                        chart.distance_cm()
                    )),
                    stimulus: Stimulus::Text(chart.text().unwrap_or("")),
                    size: None,
                    progress: None,
                    feedback: None,
                    hint,
                    theme: chart.theme(),
                    margin_px: ctx.margin_px,
                })
            }
        }
    }
}

fn run_chart(app: &mut App, args: ChartArgs) -> Result<()> {
    let sizing = app.settings.calibration.require_calibrated()?;

    let mut chart = match args.kind {
        ChartKind::Acuity => {
            let optotype = match args.optotype {
                ChartOptotypeArg::Letters => ChartOptotype::Symbols(OptotypePool::Snellen),
                ChartOptotypeArg::Pediatric => ChartOptotype::Symbols(OptotypePool::Pediatric),
                ChartOptotypeArg::TumblingE => ChartOptotype::TumblingE,
            };
            let mut chart = AcuityChart::new(optotype);
            chart.start();
            ChartScreen::Acuity(chart)
        }
        ChartKind::Jaeger => {
            let mut chart = JaegerChart::new(TextLocale::from_tag(&args.locale));
            chart.start();
            ChartScreen::Jaeger(chart)
        }
    };
    if app.settings.high_contrast {
        chart.toggle_theme();
    }

    check_display(&mut app.logger);

    // Display owns raw-mode cleanup on drop
    let display = Display::interactive().context("entering alternate screen")?;
    InputHandler::enable_raw_mode().context("enabling raw mode")?;
    app.logger.set_console_muted(true);

    let exited = chart_loop(app, &mut chart, &display, sizing);

    drop(display);
    app.logger.set_console_muted(false);

    if exited? {
        app.settings.record_test(Utc::now());
        app.save()?;
        app.logger
            .info(format!("Chart closed (sessions so far: {})", app.settings.test_count));
    }
    Ok(())
}

/// Returns true when the chart was left through its own exit action
fn chart_loop(
    app: &mut App,
    chart: &mut ChartScreen,
    display: &Display,
    sizing: tv_visual_check::SizingContext,
) -> Result<bool> {
    let input = InputHandler::new();
    let mut dirty = true;

    loop {
        if dirty {
            let ctx = ScreenContext {
                sizing,
                margin_px: app.ui.safe_margin(),
                theme: app.theme(),
            };
            chart.render(display, &ctx)?;
            dirty = false;
        }

        let Some(key) = input.read_key()? else {
            continue;
        };
        if InputHandler::is_exit(&key) {
            return Ok(false);
        }

        let action = normalize_key(&key);
        if action.is_navigation() {
            app.ui.promote_to_tv();
        }

        match InputHandler::key_to_char(&key) {
            Some('t') | Some('T') => {
                chart.toggle_theme();
                dirty = true;
                continue;
            }
            Some(c) if c.is_ascii_digit() => {
                let index = c.to_digit(10).map(|d| d as usize).unwrap_or(0);
                dirty = chart.go_to_line(index);
                continue;
            }
            _ => {}
        }

        match chart.handle_action(action) {
            ChartCommand::Redraw => dirty = true,
            ChartCommand::Ignored => {}
            ChartCommand::Exit => return Ok(true),
        }
    }
}
