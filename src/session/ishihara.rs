//! Ishihara color-plate walk
//!
//! Plates are shown in a fixed order. Each answer is recorded immediately,
//! feedback stays up for a short delay, then the next plate (or the end of
//! the run) follows. The delayed step belongs to the session that scheduled
//! it: a restart during the delay discards it.

use super::state::TestPhase;
use super::timer::DeferredTransitions;
use crate::optotype::ishihara::{
    analyze_results, check_answer, DiagnosisThresholds, IshiharaPlate, IshiharaResult,
    PlateAnswer, ISHIHARA_PLATES,
};
use std::time::{Duration, Instant};

/// Time the answer feedback stays visible before the walk moves on
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(500);

/// Deferred step scheduled by an answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlateAdvance {
    NextPlate,
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlateProgress {
    pub current: usize,
    pub total: usize,
    pub percentage: f64,
}

pub struct IshiharaTest {
    phase: TestPhase,
    plates: &'static [IshiharaPlate],
    plate_index: usize,
    answers: Vec<PlateAnswer>,
    showing_feedback: bool,
    transitions: DeferredTransitions<PlateAdvance>,
    feedback_delay: Duration,
    thresholds: DiagnosisThresholds,
}

impl IshiharaTest {
    /// Walk over the first `plate_count` plates (all plates when `None`)
    pub fn new(plate_count: Option<usize>) -> Self {
        let count = plate_count
            .unwrap_or(ISHIHARA_PLATES.len())
            .clamp(1, ISHIHARA_PLATES.len());

        IshiharaTest {
            phase: TestPhase::Ready,
            plates: &ISHIHARA_PLATES[..count],
            plate_index: 0,
            answers: Vec::new(),
            showing_feedback: false,
            transitions: DeferredTransitions::new(),
            feedback_delay: FEEDBACK_DELAY,
            thresholds: DiagnosisThresholds::default(),
        }
    }

    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    pub fn with_thresholds(mut self, thresholds: DiagnosisThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn reset(&mut self) {
        self.transitions.cancel_all();
        self.plate_index = 0;
        self.answers.clear();
        self.showing_feedback = false;
    }

    pub fn start(&mut self) {
        self.reset();
        self.phase = TestPhase::Testing;
    }

    pub fn restart(&mut self) {
        self.reset();
        self.phase = TestPhase::Ready;
    }

    /// Record an answer for the current plate and schedule the advance.
    /// Ignored outside a run and while feedback for the previous answer is up.
    pub fn submit_answer(&mut self, answer: &str, now: Instant) -> Option<bool> {
        if self.phase != TestPhase::Testing || self.showing_feedback {
            return None;
        }

        let plate = *self.current_plate();
        let is_correct = check_answer(&plate, answer);

        self.answers.push(PlateAnswer {
            plate_id: plate.id,
            user_answer: answer.trim().to_string(),
            is_correct,
            plate,
        });
        self.showing_feedback = true;

        let step = if self.is_last_plate() {
            PlateAdvance::Finish
        } else {
            PlateAdvance::NextPlate
        };
        self.transitions.schedule(now, self.feedback_delay, step);

        Some(is_correct)
    }

    /// Subject sees no figure on the plate
    pub fn cannot_see(&mut self, now: Instant) -> Option<bool> {
        self.submit_answer("", now)
    }

    pub fn skip_plate(&mut self, now: Instant) -> Option<bool> {
        self.submit_answer("", now)
    }

    /// Apply a due advance, if any. Call from the event loop.
    pub fn poll(&mut self, now: Instant) -> Option<PlateAdvance> {
        let step = self.transitions.poll(now)?;
        self.showing_feedback = false;

        match step {
            PlateAdvance::NextPlate => self.plate_index += 1,
            PlateAdvance::Finish => self.phase = TestPhase::Finished,
        }

        Some(step)
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn plates(&self) -> &'static [IshiharaPlate] {
        self.plates
    }

    pub fn current_plate(&self) -> &'static IshiharaPlate {
        let plates = self.plates;
        &plates[self.plate_index.min(plates.len() - 1)]
    }

    pub fn current_plate_index(&self) -> usize {
        self.plate_index
    }

    pub fn is_last_plate(&self) -> bool {
        self.plate_index + 1 >= self.plates.len()
    }

    /// Feedback for the last answer is on screen
    pub fn showing_feedback(&self) -> bool {
        self.showing_feedback
    }

    /// Most recent answer, for feedback display
    pub fn last_answer(&self) -> Option<&PlateAnswer> {
        self.answers.last()
    }

    pub fn answers(&self) -> &[PlateAnswer] {
        &self.answers
    }

    pub fn progress(&self) -> PlateProgress {
        let total = self.plates.len();
        let current = self.plate_index + 1;
        PlateProgress {
            current,
            total,
            percentage: current as f64 / total as f64 * 100.0,
        }
    }

    /// Screening classification; only available once the walk finished
    pub fn result(&self) -> Option<IshiharaResult> {
        if self.phase != TestPhase::Finished {
            return None;
        }
        Some(analyze_results(&self.answers, &self.thresholds))
    }
}
