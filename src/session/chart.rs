//! Free-navigation charts for examiner-led use
//!
//! No scoring: the examiner moves between lines, reshuffles the symbols and
//! flips the theme. Leaving a chart is reported to the caller, which owns
//! the test counter.

use crate::action::Action;
use crate::calibration::SizingContext;
use crate::optotype::generator::{self, Direction, OptotypePool, TUMBLING_E_GLYPH};
use crate::optotype::jaeger::{self, JaegerLine, TextLocale, JAEGER_DISTANCE_CM, JAEGER_LINES};
use crate::optotype::lines::{AcuityLine, ACUITY_LINES};
use crate::optotype::OptotypeSize;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Acuity chart opens on 20/40
pub const ACUITY_CHART_START_INDEX: usize = 5;
pub const ACUITY_CHART_SYMBOLS: usize = 5;
/// Jaeger chart opens mid-scale (J7)
pub const JAEGER_CHART_START_INDEX: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChartTheme {
    #[default]
    Day,
    Night,
}

impl ChartTheme {
    pub fn toggled(self) -> Self {
        match self {
            ChartTheme::Day => ChartTheme::Night,
            ChartTheme::Night => ChartTheme::Day,
        }
    }
}

/// Result of feeding an action to a chart
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartCommand {
    Redraw,
    Ignored,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartOptotype {
    Symbols(OptotypePool),
    TumblingE,
}

pub struct AcuityChart {
    optotype: ChartOptotype,
    active: bool,
    line_index: usize,
    symbols: Vec<char>,
    directions: Vec<Direction>,
    theme: ChartTheme,
    rng: StdRng,
}

impl AcuityChart {
    pub fn new(optotype: ChartOptotype) -> Self {
        Self::with_rng(optotype, StdRng::from_entropy())
    }

    pub fn with_seed(optotype: ChartOptotype, seed: u64) -> Self {
        Self::with_rng(optotype, StdRng::seed_from_u64(seed))
    }

    fn with_rng(optotype: ChartOptotype, rng: StdRng) -> Self {
        AcuityChart {
            optotype,
            active: false,
            line_index: ACUITY_CHART_START_INDEX,
            symbols: Vec::new(),
            directions: Vec::new(),
            theme: ChartTheme::Day,
            rng,
        }
    }

    fn regenerate(&mut self) {
        match self.optotype {
            ChartOptotype::Symbols(pool) => {
                let last = self.symbols.last().copied();
                self.symbols =
                    generator::sequence(pool.symbols(), ACUITY_CHART_SYMBOLS, last.as_ref(), &mut self.rng);
            }
            ChartOptotype::TumblingE => {
                self.symbols = vec![TUMBLING_E_GLYPH; ACUITY_CHART_SYMBOLS];
                self.directions = generator::direction_sequence(ACUITY_CHART_SYMBOLS, &mut self.rng);
            }
        }
    }

    pub fn start(&mut self) {
        self.active = true;
        self.line_index = ACUITY_CHART_START_INDEX;
        self.regenerate();
    }

    pub fn exit(&mut self) {
        self.active = false;
    }

    pub fn can_go_smaller(&self) -> bool {
        self.line_index + 1 < ACUITY_LINES.len()
    }

    pub fn can_go_larger(&self) -> bool {
        self.line_index > 0
    }

    pub fn go_smaller(&mut self) -> bool {
        if !self.can_go_smaller() {
            return false;
        }
        self.line_index += 1;
        self.regenerate();
        true
    }

    pub fn go_larger(&mut self) -> bool {
        if !self.can_go_larger() {
            return false;
        }
        self.line_index -= 1;
        self.regenerate();
        true
    }

    pub fn go_to_line(&mut self, index: usize) -> bool {
        if index >= ACUITY_LINES.len() {
            return false;
        }
        self.line_index = index;
        self.regenerate();
        true
    }

    pub fn randomize(&mut self) {
        self.regenerate();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn handle_action(&mut self, action: Action) -> ChartCommand {
        if !self.active {
            return ChartCommand::Ignored;
        }

        match action {
            Action::Down => redraw_if(self.go_smaller()),
            Action::Up => redraw_if(self.go_larger()),
            Action::Right | Action::Confirm => {
                self.randomize();
                ChartCommand::Redraw
            }
            Action::Left | Action::Back => {
                self.exit();
                ChartCommand::Exit
            }
            Action::None => ChartCommand::Ignored,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn optotype(&self) -> ChartOptotype {
        self.optotype
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn current_line(&self) -> &'static AcuityLine {
        &ACUITY_LINES[self.line_index.min(ACUITY_LINES.len() - 1)]
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Per-symbol rotation; empty unless the chart shows the tumbling E
    pub fn rotations(&self) -> Vec<u16> {
        self.directions.iter().map(Direction::rotation_degrees).collect()
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn theme(&self) -> ChartTheme {
        self.theme
    }

    pub fn optotype_size(&self, sizing: &SizingContext) -> OptotypeSize {
        sizing.optotype_size(self.current_line().log_mar)
    }
}

/// Near-vision chart. `JAEGER_LINES` runs J1 upward, so "larger" is a higher index.
pub struct JaegerChart {
    locale: TextLocale,
    active: bool,
    line_index: usize,
    text: Option<&'static str>,
    theme: ChartTheme,
    rng: StdRng,
}

impl JaegerChart {
    pub fn new(locale: TextLocale) -> Self {
        Self::with_rng(locale, StdRng::from_entropy())
    }

    pub fn with_seed(locale: TextLocale, seed: u64) -> Self {
        Self::with_rng(locale, StdRng::seed_from_u64(seed))
    }

    fn with_rng(locale: TextLocale, rng: StdRng) -> Self {
        JaegerChart {
            locale,
            active: false,
            line_index: JAEGER_CHART_START_INDEX,
            text: None,
            theme: ChartTheme::Day,
            rng,
        }
    }

    fn regenerate(&mut self) {
        self.text = Some(jaeger::random_text(self.locale, self.text, &mut self.rng));
    }

    pub fn start(&mut self) {
        self.active = true;
        self.line_index = JAEGER_CHART_START_INDEX;
        self.regenerate();
    }

    pub fn exit(&mut self) {
        self.active = false;
    }

    pub fn can_go_smaller(&self) -> bool {
        self.line_index > 0
    }

    pub fn can_go_larger(&self) -> bool {
        self.line_index + 1 < JAEGER_LINES.len()
    }

    pub fn go_smaller(&mut self) -> bool {
        if !self.can_go_smaller() {
            return false;
        }
        self.line_index -= 1;
        self.regenerate();
        true
    }

    pub fn go_larger(&mut self) -> bool {
        if !self.can_go_larger() {
            return false;
        }
        self.line_index += 1;
        self.regenerate();
        true
    }

    pub fn go_to_line(&mut self, index: usize) -> bool {
        if index >= JAEGER_LINES.len() {
            return false;
        }
        self.line_index = index;
        self.regenerate();
        true
    }

    pub fn randomize(&mut self) {
        self.regenerate();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn handle_action(&mut self, action: Action) -> ChartCommand {
        if !self.active {
            return ChartCommand::Ignored;
        }

        match action {
            Action::Up => redraw_if(self.go_larger()),
            Action::Down => redraw_if(self.go_smaller()),
            Action::Right => {
                self.randomize();
                ChartCommand::Redraw
            }
            Action::Left | Action::Back => {
                self.exit();
                ChartCommand::Exit
            }
            Action::Confirm | Action::None => ChartCommand::Ignored,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn current_line(&self) -> &'static JaegerLine {
        let lines: &'static [JaegerLine] = &JAEGER_LINES;
        &lines[self.line_index.min(lines.len() - 1)]
    }

    pub fn text(&self) -> Option<&'static str> {
        self.text
    }

    pub fn theme(&self) -> ChartTheme {
        self.theme
    }

    pub fn distance_cm(&self) -> u32 {
        JAEGER_DISTANCE_CM
    }

    pub fn font_size_px(&self, sizing: &SizingContext) -> f64 {
        sizing.jaeger_font_size(self.current_line().point_size)
    }
}

fn redraw_if(changed: bool) -> ChartCommand {
    if changed {
        ChartCommand::Redraw
    } else {
        ChartCommand::Ignored
    }
}
