//! Directional tests: tumbling E and Landolt ring
//!
//! Unlike the letter test, a fresh direction is drawn after every answer,
//! including answers that do not complete the line.

use super::state::{AnswerOutcome, LadderConfig, LineLadder, LineResult, LineStep, Progress, TestPhase};
use crate::calibration::SizingContext;
use crate::optotype::generator::{self, Direction, LANDOLT_GLYPH, TUMBLING_E_GLYPH};
use crate::optotype::lines::{AcuityLine, ACUITY_LINES};
use crate::optotype::OptotypeSize;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Rotated optotype shown by a directional test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionalOptotype {
    TumblingE,
    LandoltRing,
}

impl DirectionalOptotype {
    pub fn glyph(&self) -> char {
        match self {
            DirectionalOptotype::TumblingE => TUMBLING_E_GLYPH,
            DirectionalOptotype::LandoltRing => LANDOLT_GLYPH,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DirectionalOptotype::TumblingE => "Tumbling E",
            DirectionalOptotype::LandoltRing => "Landolt C",
        }
    }
}

pub struct DirectionalTest {
    optotype: DirectionalOptotype,
    ladder: LineLadder<AcuityLine>,
    direction: Option<Direction>,
    rng: StdRng,
}

impl DirectionalTest {
    pub fn new(optotype: DirectionalOptotype, config: LadderConfig) -> Self {
        Self::with_rng(optotype, config, StdRng::from_entropy())
    }

    pub fn with_seed(optotype: DirectionalOptotype, config: LadderConfig, seed: u64) -> Self {
        Self::with_rng(optotype, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(optotype: DirectionalOptotype, config: LadderConfig, rng: StdRng) -> Self {
        DirectionalTest {
            optotype,
            ladder: LineLadder::new(&ACUITY_LINES, config),
            direction: None,
            rng,
        }
    }

    pub fn tumbling_e(config: LadderConfig) -> Self {
        Self::new(DirectionalOptotype::TumblingE, config)
    }

    pub fn landolt(config: LadderConfig) -> Self {
        Self::new(DirectionalOptotype::LandoltRing, config)
    }

    fn generate_direction(&mut self) {
        self.direction = Some(generator::next_direction(self.direction, &mut self.rng));
    }

    pub fn start(&mut self) {
        self.ladder.start();
        self.generate_direction();
    }

    /// Score the direction the subject reported
    pub fn submit_answer(&mut self, input: Direction) -> Option<AnswerOutcome> {
        if self.ladder.phase() != TestPhase::Testing {
            return None;
        }

        let correct = self.direction == Some(input);
        let outcome = self.ladder.record(correct)?;

        if outcome.step != LineStep::Finished {
            self.generate_direction();
        }

        Some(outcome)
    }

    pub fn restart(&mut self) {
        self.ladder.restart();
        self.direction = None;
    }

    pub fn optotype(&self) -> DirectionalOptotype {
        self.optotype
    }

    pub fn phase(&self) -> TestPhase {
        self.ladder.phase()
    }

    pub fn current_line(&self) -> &'static AcuityLine {
        self.ladder.current_line()
    }

    pub fn current_direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn current_rotation(&self) -> Option<u16> {
        self.direction.map(|d| d.rotation_degrees())
    }

    pub fn current_attempt(&self) -> usize {
        self.ladder.unit_index()
    }

    pub fn optotype_size(&self, sizing: &SizingContext) -> OptotypeSize {
        sizing.optotype_size(self.current_line().log_mar)
    }

    pub fn progress(&self) -> Progress {
        self.ladder.progress()
    }

    pub fn results(&self) -> &[LineResult<AcuityLine>] {
        self.ladder.results()
    }

    pub fn best_result(&self) -> Option<&LineResult<AcuityLine>> {
        self.ladder.best_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrong(d: Direction) -> Direction {
        match d {
            Direction::Up => Direction::Down,
            _ => Direction::Up,
        }
    }

    #[test]
    fn test_new_direction_after_every_answer() {
        let mut test =
            DirectionalTest::with_seed(DirectionalOptotype::TumblingE, LadderConfig::default(), 9);
        test.start();
        for _ in 0..4 {
            let before = test.current_direction().expect("direction");
            let outcome = test.submit_answer(before).expect("testing");
            assert!(outcome.correct);
            assert_ne!(test.current_direction(), Some(before));
        }
    }

    #[test]
    fn test_all_wrong_finishes_on_first_line() {
        let mut test =
            DirectionalTest::with_seed(DirectionalOptotype::LandoltRing, LadderConfig::default(), 10);
        test.start();
        for _ in 0..5 {
            let d = test.current_direction().expect("direction");
            test.submit_answer(wrong(d));
        }
        assert_eq!(test.phase(), TestPhase::Finished);
        assert_eq!(test.results().len(), 1);
        assert!(!test.results()[0].passed);
        assert!(test.submit_answer(Direction::Up).is_none());
    }

    #[test]
    fn test_three_of_five_passes() {
        let mut test =
            DirectionalTest::with_seed(DirectionalOptotype::TumblingE, LadderConfig::default(), 11);
        test.start();
        for i in 0..5 {
            let d = test.current_direction().expect("direction");
            test.submit_answer(if i < 3 { d } else { wrong(d) });
        }
        assert_eq!(test.current_line().snellen, "20/200");
        assert_eq!(test.current_attempt(), 0);
        assert!(test.results()[0].passed);
    }

    #[test]
    fn test_custom_config() {
        let config = LadderConfig {
            units_per_line: 2,
            required_correct: 2,
        };
        let mut test = DirectionalTest::with_seed(DirectionalOptotype::TumblingE, config, 12);
        test.start();
        let d = test.current_direction().expect("direction");
        test.submit_answer(d);
        let d = test.current_direction().expect("direction");
        test.submit_answer(wrong(d));
        assert_eq!(test.phase(), TestPhase::Finished);
        assert_eq!(test.results()[0].total_attempts, 2);
    }

    #[test]
    fn test_restart_clears_direction() {
        let mut test =
            DirectionalTest::with_seed(DirectionalOptotype::TumblingE, LadderConfig::default(), 13);
        test.start();
        assert!(test.current_rotation().is_some());
        test.restart();
        assert_eq!(test.phase(), TestPhase::Ready);
        assert_eq!(test.current_direction(), None);
        assert_eq!(test.optotype().glyph(), 'E');
    }
}
