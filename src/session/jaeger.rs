//! Jaeger near-vision reading test
//!
//! Same line bookkeeping as the distance tests, walked in table order from
//! J1 upward. An answer is either a typed read-back (fuzzy matched), a plain
//! "I can read it" or "I cannot read it".

use super::similarity;
use super::state::{AnswerOutcome, LadderConfig, LineLadder, LineResult, LineStep, Progress, TestPhase};
use crate::calibration::SizingContext;
use crate::optotype::jaeger::{self, JaegerLine, TextLocale, JAEGER_DISTANCE_CM, JAEGER_LINES};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Near-test default: 3 passages per line, 2 must be read
pub const JAEGER_DEFAULT_CONFIG: LadderConfig = LadderConfig {
    units_per_line: 3,
    required_correct: 2,
};

/// Outcome of a typed read-back
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadBackOutcome {
    pub similarity: f64,
    pub outcome: AnswerOutcome,
}

pub struct JaegerTest {
    ladder: LineLadder<JaegerLine>,
    locale: TextLocale,
    text: Option<&'static str>,
    show_text: bool,
    rng: StdRng,
}

impl JaegerTest {
    pub fn new(locale: TextLocale, config: LadderConfig) -> Self {
        Self::with_rng(locale, config, StdRng::from_entropy())
    }

    pub fn with_seed(locale: TextLocale, config: LadderConfig, seed: u64) -> Self {
        Self::with_rng(locale, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(locale: TextLocale, config: LadderConfig, rng: StdRng) -> Self {
        let lines: &'static [JaegerLine] = &JAEGER_LINES;
        JaegerTest {
            ladder: LineLadder::new(lines, config),
            locale,
            text: None,
            show_text: true,
            rng,
        }
    }

    fn generate_text(&mut self) {
        self.text = Some(jaeger::random_text(self.locale, self.text, &mut self.rng));
        self.show_text = true;
    }

    pub fn start(&mut self) {
        self.ladder.start();
        self.generate_text();
    }

    fn record(&mut self, correct: bool) -> Option<AnswerOutcome> {
        let outcome = self.ladder.record(correct)?;
        if outcome.step != LineStep::Finished {
            self.generate_text();
        }
        Some(outcome)
    }

    /// Fuzzy-match a typed read-back against the passage on screen
    pub fn submit_answer(&mut self, answer: &str) -> Option<ReadBackOutcome> {
        if self.ladder.phase() != TestPhase::Testing {
            return None;
        }

        let expected = self.text?;
        let similarity = similarity::similarity(answer, expected);
        let outcome = self.record(similarity >= similarity::MATCH_THRESHOLD)?;

        Some(ReadBackOutcome {
            similarity,
            outcome,
        })
    }

    /// Subject confirms the passage was readable
    pub fn confirm_reading(&mut self) -> Option<AnswerOutcome> {
        self.record(true)
    }

    /// Subject reports the passage was not readable
    pub fn cannot_read(&mut self) -> Option<AnswerOutcome> {
        self.record(false)
    }

    /// Hide the passage while the subject types it back
    pub fn hide_text_and_ask_for_input(&mut self) {
        if self.ladder.phase() == TestPhase::Testing {
            self.show_text = false;
        }
    }

    pub fn restart(&mut self) {
        self.ladder.restart();
        self.text = None;
        self.show_text = true;
    }

    pub fn phase(&self) -> TestPhase {
        self.ladder.phase()
    }

    pub fn current_line(&self) -> &'static JaegerLine {
        self.ladder.current_line()
    }

    pub fn current_text(&self) -> Option<&'static str> {
        self.text
    }

    pub fn show_text(&self) -> bool {
        self.show_text
    }

    pub fn current_attempt(&self) -> usize {
        self.ladder.unit_index()
    }

    pub fn distance_cm(&self) -> u32 {
        JAEGER_DISTANCE_CM
    }

    pub fn font_size_px(&self, sizing: &SizingContext) -> f64 {
        sizing.jaeger_font_size(self.current_line().point_size)
    }

    pub fn progress(&self) -> Progress {
        self.ladder.progress()
    }

    pub fn results(&self) -> &[LineResult<JaegerLine>] {
        self.ladder.results()
    }

    pub fn best_result(&self) -> Option<&LineResult<JaegerLine>> {
        self.ladder.best_result()
    }
}
