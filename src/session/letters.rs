//! Letter-sequence test (Snellen letters or pediatric symbols)
//!
//! The whole line is generated when the line starts and an index walks
//! through it; the first symbol of a new line never repeats the last symbol
//! of the previous one.

use super::state::{AnswerOutcome, LadderConfig, LineLadder, LineResult, LineStep, Progress, TestPhase};
use crate::calibration::SizingContext;
use crate::optotype::generator::{self, OptotypePool};
use crate::optotype::lines::{AcuityLine, ACUITY_LINES};
use crate::optotype::OptotypeSize;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct LetterTest {
    ladder: LineLadder<AcuityLine>,
    pool: OptotypePool,
    sequence: Vec<char>,
    rng: StdRng,
}

impl LetterTest {
    pub fn new(pool: OptotypePool, config: LadderConfig) -> Self {
        Self::with_rng(pool, config, StdRng::from_entropy())
    }

    /// Deterministic symbol stream for reproducible runs
    pub fn with_seed(pool: OptotypePool, config: LadderConfig, seed: u64) -> Self {
        Self::with_rng(pool, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool: OptotypePool, config: LadderConfig, rng: StdRng) -> Self {
        LetterTest {
            ladder: LineLadder::new(&ACUITY_LINES, config),
            pool,
            sequence: Vec::new(),
            rng,
        }
    }

    fn generate_sequence(&mut self) {
        let last = self.sequence.last().copied();
        self.sequence = generator::sequence(
            self.pool.symbols(),
            self.ladder.config().units_per_line,
            last.as_ref(),
            &mut self.rng,
        );
    }

    pub fn start(&mut self) {
        self.ladder.start();
        self.generate_sequence();
    }

    /// Compare `input` with the symbol on screen (case-insensitive)
    pub fn submit_answer(&mut self, input: char) -> Option<AnswerOutcome> {
        if self.ladder.phase() != TestPhase::Testing {
            return None;
        }

        let expected = self.current_char()?;
        let correct = expected.to_uppercase().eq(input.to_uppercase());
        let outcome = self.ladder.record(correct)?;

        if outcome.step == LineStep::NextLine {
            self.generate_sequence();
        }

        Some(outcome)
    }

    pub fn restart(&mut self) {
        self.ladder.restart();
        self.sequence.clear();
    }

    pub fn phase(&self) -> TestPhase {
        self.ladder.phase()
    }

    pub fn pool(&self) -> OptotypePool {
        self.pool
    }

    pub fn current_line(&self) -> &'static AcuityLine {
        self.ladder.current_line()
    }

    /// Symbol to identify now; `None` outside a run
    pub fn current_char(&self) -> Option<char> {
        if self.ladder.phase() != TestPhase::Testing {
            return None;
        }
        self.sequence.get(self.ladder.unit_index()).copied()
    }

    pub fn current_sequence(&self) -> &[char] {
        &self.sequence
    }

    pub fn current_char_index(&self) -> usize {
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

    fn other_than(c: char) -> char {
        if c == 'X' {
            'Y'
        } else {
            'X'
        }
    }

    #[test]
    fn test_start_generates_full_line() {
        let mut test = LetterTest::with_seed(OptotypePool::Snellen, LadderConfig::default(), 1);
        assert_eq!(test.current_char(), None);
        test.start();
        assert_eq!(test.phase(), TestPhase::Testing);
        assert_eq!(test.current_sequence().len(), 5);
        assert!(test
            .current_sequence()
            .windows(2)
            .all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_case_insensitive_answers() {
        let mut test = LetterTest::with_seed(OptotypePool::Snellen, LadderConfig::default(), 2);
        test.start();
        let expected = test.current_char().expect("symbol");
        let outcome = test
            .submit_answer(expected.to_ascii_lowercase())
            .expect("testing");
        assert!(outcome.correct);
        assert_eq!(outcome.step, LineStep::Continue);
        assert_eq!(test.current_char_index(), 1);
    }

    #[test]
    fn test_all_wrong_first_line_finishes() {
        let mut test = LetterTest::with_seed(OptotypePool::Snellen, LadderConfig::default(), 3);
        test.start();
        for _ in 0..5 {
            let c = test.current_char().expect("symbol");
            test.submit_answer(other_than(c));
        }
        assert_eq!(test.phase(), TestPhase::Finished);
        assert_eq!(test.results().len(), 1);
        assert!(!test.results()[0].passed);
        assert_eq!(test.submit_answer('C'), None);
    }

    #[test]
    fn test_pass_moves_to_new_sequence() {
        let mut test = LetterTest::with_seed(OptotypePool::Snellen, LadderConfig::default(), 4);
        test.start();
        for i in 0..5 {
            let c = test.current_char().expect("symbol");
            let answer = if i < 3 { c } else { other_than(c) };
            test.submit_answer(answer);
        }
        assert_eq!(test.phase(), TestPhase::Testing);
        assert_eq!(test.current_line().snellen, "20/200");
        assert_eq!(test.current_char_index(), 0);
        assert_eq!(test.best_result().map(|r| r.line.snellen), Some("20/400"));
    }

    #[test]
    fn test_pediatric_pool() {
        let mut test = LetterTest::with_seed(OptotypePool::Pediatric, LadderConfig::default(), 5);
        test.start();
        let c = test.current_char().expect("symbol");
        assert!(OptotypePool::Pediatric.symbols().contains(&c));
        assert!(test.submit_answer(c).map(|o| o.correct).unwrap_or(false));
    }

    #[test]
    fn test_restart_mid_run() {
        let mut test = LetterTest::with_seed(OptotypePool::Snellen, LadderConfig::default(), 6);
        test.start();
        let c = test.current_char().expect("symbol");
        test.submit_answer(c);
        test.restart();
        assert_eq!(test.phase(), TestPhase::Ready);
        assert!(test.results().is_empty());
        assert!(test.current_sequence().is_empty());
        assert_eq!(test.current_char_index(), 0);
    }
}
