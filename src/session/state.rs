//! Line-ladder bookkeeping shared by every acuity test-run
//!
//! Maintains:
//! - Phase (ready → testing → finished, finished is terminal until restart)
//! - Current line and position within the line
//! - Correct answers in the current line
//! - One `LineResult` per completed line, in presentation order
//!
//! A line is complete after `units_per_line` answers. The run stops at the
//! first failed line or after the last line of the chart.

use crate::optotype::lines::ChartLine;

/// Lifecycle of a test-run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestPhase {
    Ready,
    Testing,
    Finished,
}

/// Pass rule for one line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LadderConfig {
    /// Symbols (or attempts) shown per line
    pub units_per_line: usize,
    /// Correct answers needed to pass the line
    pub required_correct: usize,
}

impl Default for LadderConfig {
    fn default() -> Self {
        LadderConfig {
            units_per_line: 5,
            required_correct: 3,
        }
    }
}

/// Score of one completed line
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineResult<L> {
    pub line: L,
    pub correct_count: usize,
    pub total_attempts: usize,
    pub passed: bool,
}

/// What recording an answer did to the run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStep {
    /// Still inside the same line
    Continue,
    /// Line passed, moved on to the next one
    NextLine,
    /// Run is over (line failed or chart exhausted)
    Finished,
}

/// Outcome of one submitted answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub step: LineStep,
}

/// Position of the run for progress displays (1-based)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub line: usize,
    pub total_lines: usize,
    pub unit: usize,
    pub units_in_line: usize,
}

/// Shared state machine of the letter, directional, Landolt and Jaeger tests
#[derive(Clone, Debug)]
pub struct LineLadder<L: ChartLine + 'static> {
    lines: &'static [L],
    config: LadderConfig,
    phase: TestPhase,
    line_index: usize,
    unit_index: usize,
    correct_in_line: usize,
    results: Vec<LineResult<L>>,
}

impl<L: ChartLine + 'static> LineLadder<L> {
    /// Create a ladder over `lines` (presented in slice order)
    pub fn new(lines: &'static [L], config: LadderConfig) -> Self {
        let config = LadderConfig {
            units_per_line: config.units_per_line.max(1),
            required_correct: config.required_correct,
        };

        LineLadder {
            lines,
            config,
            phase: TestPhase::Ready,
            line_index: 0,
            unit_index: 0,
            correct_in_line: 0,
            results: Vec::new(),
        }
    }

    /// Enter `Testing` from any phase with all counters cleared
    pub fn start(&mut self) {
        self.reset_counters();
        self.phase = TestPhase::Testing;
    }

    /// Back to `Ready` with all counters and results cleared
    pub fn restart(&mut self) {
        self.reset_counters();
        self.phase = TestPhase::Ready;
    }

    fn reset_counters(&mut self) {
        self.line_index = 0;
        self.unit_index = 0;
        self.correct_in_line = 0;
        self.results.clear();
    }

    /// Score one answer. `None` when the run is not in `Testing`.
    pub fn record(&mut self, correct: bool) -> Option<AnswerOutcome> {
        if self.phase != TestPhase::Testing {
            return None;
        }

        if correct {
            self.correct_in_line += 1;
        }
        self.unit_index += 1;

        if self.unit_index < self.config.units_per_line {
            return Some(AnswerOutcome {
                correct,
                step: LineStep::Continue,
            });
        }

        let passed = self.correct_in_line >= self.config.required_correct;
        self.results.push(LineResult {
            line: *self.current_line(),
            correct_count: self.correct_in_line,
            total_attempts: self.config.units_per_line,
            passed,
        });

        if !passed || self.is_last_line() {
            self.phase = TestPhase::Finished;
            return Some(AnswerOutcome {
                correct,
                step: LineStep::Finished,
            });
        }

        self.line_index += 1;
        self.unit_index = 0;
        self.correct_in_line = 0;

        Some(AnswerOutcome {
            correct,
            step: LineStep::NextLine,
        })
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn config(&self) -> LadderConfig {
        self.config
    }

    pub fn lines(&self) -> &'static [L] {
        self.lines
    }

    pub fn current_line(&self) -> &'static L {
        let lines = self.lines;
        &lines[self.line_index.min(lines.len().saturating_sub(1))]
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    /// Index of the symbol/attempt within the current line
    pub fn unit_index(&self) -> usize {
        self.unit_index
    }

    pub fn correct_in_line(&self) -> usize {
        self.correct_in_line
    }

    pub fn results(&self) -> &[LineResult<L>] {
        &self.results
    }

    pub fn is_last_line(&self) -> bool {
        self.line_index + 1 >= self.lines.len()
    }

    /// Passed line with the smallest logMAR; the earliest wins on ties
    pub fn best_result(&self) -> Option<&LineResult<L>> {
        self.results
            .iter()
            .filter(|r| r.passed)
            .fold(None, |best: Option<&LineResult<L>>, current| match best {
                Some(b) if b.line.log_mar() <= current.line.log_mar() => Some(b),
                _ => Some(current),
            })
    }

    pub fn progress(&self) -> Progress {
        Progress {
            line: self.line_index + 1,
            total_lines: self.lines.len(),
            unit: (self.unit_index + 1).min(self.config.units_per_line),
            units_in_line: self.config.units_per_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optotype::lines::{AcuityLine, ACUITY_LINES};

    fn ladder() -> LineLadder<AcuityLine> {
        LineLadder::new(&ACUITY_LINES, LadderConfig::default())
    }

    #[test]
    fn test_answers_ignored_before_start() {
        let mut l = ladder();
        assert_eq!(l.record(true), None);
        assert_eq!(l.phase(), TestPhase::Ready);
        assert_eq!(l.unit_index(), 0);
    }

    #[test]
    fn test_failed_first_line_finishes() {
        let mut l = ladder();
        l.start();
        for _ in 0..4 {
            assert_eq!(l.record(false).map(|o| o.step), Some(LineStep::Continue));
        }
        assert_eq!(l.record(false).map(|o| o.step), Some(LineStep::Finished));
        assert_eq!(l.phase(), TestPhase::Finished);
        assert_eq!(l.results().len(), 1);
        assert!(!l.results()[0].passed);
        assert_eq!(l.line_index(), 0);
        assert!(l.best_result().is_none());

        // terminal until restart
        assert_eq!(l.record(true), None);
        assert_eq!(l.results().len(), 1);
    }

    #[test]
    fn test_pass_advances_and_resets_counters() {
        let mut l = ladder();
        l.start();
        for _ in 0..3 {
            l.record(true);
        }
        l.record(false);
        let outcome = l.record(false);
        assert_eq!(outcome.map(|o| o.step), Some(LineStep::NextLine));
        assert_eq!(l.line_index(), 1);
        assert_eq!(l.unit_index(), 0);
        assert_eq!(l.correct_in_line(), 0);
        assert_eq!(l.results()[0].correct_count, 3);
        assert_eq!(l.results()[0].total_attempts, 5);
        assert!(l.results()[0].passed);
        assert_eq!(l.phase(), TestPhase::Testing);
    }

    #[test]
    fn test_perfect_run_ends_on_last_line() {
        let mut l = ladder();
        l.start();
        let mut steps = 0;
        while l.phase() == TestPhase::Testing {
            l.record(true);
            steps += 1;
        }
        assert_eq!(steps, ACUITY_LINES.len() * 5);
        assert_eq!(l.results().len(), ACUITY_LINES.len());
        assert_eq!(l.best_result().map(|r| r.line.snellen), Some("20/10"));
    }

    #[test]
    fn test_best_result_is_smallest_passed_log_mar() {
        let mut l = ladder();
        l.start();
        for _ in 0..10 {
            l.record(true);
        }
        for _ in 0..5 {
            l.record(false);
        }
        assert_eq!(l.results().len(), 3);
        assert_eq!(l.best_result().map(|r| r.line.snellen), Some("20/200"));
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut l = ladder();
        l.start();
        for _ in 0..7 {
            l.record(true);
        }
        l.restart();
        assert_eq!(l.phase(), TestPhase::Ready);
        assert!(l.results().is_empty());
        assert_eq!(l.line_index(), 0);
        assert_eq!(l.unit_index(), 0);
        assert_eq!(l.correct_in_line(), 0);
    }

    #[test]
    fn test_restart_after_finish() {
        let mut l = ladder();
        l.start();
        for _ in 0..5 {
            l.record(false);
        }
        assert_eq!(l.phase(), TestPhase::Finished);

        l.restart();
        assert_eq!(l.phase(), TestPhase::Ready);
        assert!(l.results().is_empty());
        assert!(l.best_result().is_none());

        l.start();
        assert_eq!(l.record(true).map(|o| o.step), Some(LineStep::Continue));
        assert_eq!(l.line_index(), 0);
        assert_eq!(l.correct_in_line(), 1);
    }

    #[test]
    fn test_progress_is_one_based() {
        let mut l = ladder();
        l.start();
        l.record(true);
        assert_eq!(
            l.progress(),
            Progress {
                line: 1,
                total_lines: 12,
                unit: 2,
                units_in_line: 5
            }
        );
    }
}
