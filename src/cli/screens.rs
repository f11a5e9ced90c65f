//! Interactive screens: one per test kind
//!
//! A screen owns its test-run, turns key presses into test operations and
//! describes what to draw. The event loop in the binary drives phases,
//! timers and the reset gesture.

use super::display::{Display, Feedback, Frame, Stimulus};
use super::input::{normalize_key, InputHandler};
use crate::action::Action;
use crate::calibration::SizingContext;
use crate::optotype::generator::PEDIATRIC_POOL;
use crate::optotype::ishihara::plate_options;
use crate::optotype::{ChartLine, OptotypePool};
use crate::session::{
    ChartTheme, DirectionalTest, IshiharaTest, JaegerTest, LetterTest, LineResult, Progress,
    TestPhase,
};
use crossterm::event::{KeyCode, KeyEvent};
use std::io::Result as IoResult;
use std::time::Instant;

/// Rendering inputs shared by every screen
#[derive(Clone, Copy, Debug)]
pub struct ScreenContext {
    pub sizing: SizingContext,
    pub margin_px: u32,
    pub theme: ChartTheme,
}

pub trait Screen {
    fn title(&self) -> &'static str;
    fn phase(&self) -> TestPhase;
    fn start(&mut self);
    fn restart(&mut self);
    /// Handle a key while testing
    fn handle_key(&mut self, key: &KeyEvent, now: Instant);
    fn frame(&self, ctx: &ScreenContext) -> Frame<'_>;
    /// Advance timed transitions; true when a redraw is needed
    fn tick(&mut self, _now: Instant) -> bool {
        false
    }
    /// Typing mode: letter keys are answer text, not shortcuts
    fn text_entry(&self) -> bool {
        false
    }
    fn show_summary(&self, display: &Display) -> IoResult<()>;
    /// One-line outcome for the event log
    fn summary_line(&self) -> String;
}

fn feedback_for(correct: bool) -> Feedback {
    if correct {
        Feedback::Correct
    } else {
        Feedback::Incorrect
    }
}

fn line_label<L: ChartLine>(line: &L) -> String {
    format!("{}  (logMAR {:.1})", line.label(), line.log_mar())
}

fn ladder_progress(progress: Progress) -> String {
    format!(
        "Line {}/{}  |  {}/{}",
        progress.line, progress.total_lines, progress.unit, progress.units_in_line
    )
}

fn best_line_summary<L: ChartLine>(name: &str, best: Option<&LineResult<L>>) -> String {
    match best {
        Some(result) => format!(
            "{} finished: best line {} (logMAR {:.1})",
            name,
            result.line.label(),
            result.line.log_mar()
        ),
        None => format!("{} finished: no line passed", name),
    }
}

/// Symbol pressed for the pediatric pool: keys 1-5 pick the shapes in order
pub fn pediatric_symbol(c: char) -> Option<char> {
    let index = c.to_digit(10)? as usize;
    PEDIATRIC_POOL.get(index.checked_sub(1)?).copied()
}

pub struct LetterScreen {
    test: LetterTest,
    feedback: Option<Feedback>,
}

impl LetterScreen {
    pub fn new(test: LetterTest) -> Self {
        LetterScreen {
            test,
            feedback: None,
        }
    }

    pub fn test(&self) -> &LetterTest {
        &self.test
    }
}

impl Screen for LetterScreen {
    fn title(&self) -> &'static str {
        match self.test.pool() {
            OptotypePool::Snellen => "Snellen letters",
            OptotypePool::Pediatric => "Pediatric symbols",
        }
    }

    fn phase(&self) -> TestPhase {
        self.test.phase()
    }

    fn start(&mut self) {
        self.feedback = None;
        self.test.start();
    }

    fn restart(&mut self) {
        self.feedback = None;
        self.test.restart();
    }

    fn handle_key(&mut self, key: &KeyEvent, _now: Instant) {
        let Some(c) = InputHandler::key_to_char(key) else {
            return;
        };
        let symbol = match self.test.pool() {
            OptotypePool::Snellen => Some(c),
            OptotypePool::Pediatric => pediatric_symbol(c),
        };
        if let Some(outcome) = symbol.and_then(|s| self.test.submit_answer(s)) {
            self.feedback = Some(feedback_for(outcome.correct));
        }
    }

    fn frame(&self, ctx: &ScreenContext) -> Frame<'_> {
        let index = self.test.current_char_index();
        let shown = self.test.current_sequence().get(index..=index).unwrap_or(&[]);
        let hint = match self.test.pool() {
            OptotypePool::Snellen => "Type the letter you see  |  Esc restart  |  Ctrl+C quit",
            OptotypePool::Pediatric => "1 ●  2 ■  3 ▲  4 ♥  5 ★  |  Esc restart  |  Ctrl+C quit",
        };

        Frame {
            title: self.title(),
            line_label: Some(line_label(self.test.current_line())),
            stimulus: Stimulus::Symbols(shown),
            size: Some(self.test.optotype_size(&ctx.sizing)),
            progress: Some(ladder_progress(self.test.progress())),
            feedback: self.feedback,
            hint,
            theme: ctx.theme,
            margin_px: ctx.margin_px,
        }
    }

    fn show_summary(&self, display: &Display) -> IoResult<()> {
        display.show_message(&self.summary_line())?;
        display.show_line_results(self.test.results())
    }

    fn summary_line(&self) -> String {
        best_line_summary(self.title(), self.test.best_result())
    }
}

pub struct DirectionalScreen {
    test: DirectionalTest,
    feedback: Option<Feedback>,
}

impl DirectionalScreen {
    pub fn new(test: DirectionalTest) -> Self {
        DirectionalScreen {
            test,
            feedback: None,
        }
    }
}

impl Screen for DirectionalScreen {
    fn title(&self) -> &'static str {
        self.test.optotype().name()
    }

    fn phase(&self) -> TestPhase {
        self.test.phase()
    }

    fn start(&mut self) {
        self.feedback = None;
        self.test.start();
    }

    fn restart(&mut self) {
        self.feedback = None;
        self.test.restart();
    }

    fn handle_key(&mut self, key: &KeyEvent, _now: Instant) {
        let Some(direction) = normalize_key(key).direction() else {
            return;
        };
        if let Some(outcome) = self.test.submit_answer(direction) {
            self.feedback = Some(feedback_for(outcome.correct));
        }
    }

    fn frame(&self, ctx: &ScreenContext) -> Frame<'_> {
        let stimulus = match self.test.current_direction() {
            Some(direction) => Stimulus::Oriented {
                optotype: self.test.optotype(),
                direction,
            },
            None => Stimulus::Symbols(&[]),
        };

        Frame {
            title: self.title(),
            line_label: Some(line_label(self.test.current_line())),
            stimulus,
            size: Some(self.test.optotype_size(&ctx.sizing)),
            progress: Some(ladder_progress(self.test.progress())),
            feedback: self.feedback,
            hint: "Arrow toward the opening  |  Esc restart  |  Ctrl+C quit",
            theme: ctx.theme,
            margin_px: ctx.margin_px,
        }
    }

    fn show_summary(&self, display: &Display) -> IoResult<()> {
        display.show_message(&self.summary_line())?;
        display.show_line_results(self.test.results())
    }

    fn summary_line(&self) -> String {
        best_line_summary(self.title(), self.test.best_result())
    }
}

pub struct JaegerScreen {
    test: JaegerTest,
    typed: String,
    feedback: Option<Feedback>,
}

impl JaegerScreen {
    pub fn new(test: JaegerTest) -> Self {
        JaegerScreen {
            test,
            typed: String::new(),
            feedback: None,
        }
    }

    pub fn test(&self) -> &JaegerTest {
        &self.test
    }
}

impl Screen for JaegerScreen {
    fn title(&self) -> &'static str {
        "Jaeger near vision"
    }

    fn phase(&self) -> TestPhase {
        self.test.phase()
    }

    fn start(&mut self) {
        self.typed.clear();
        self.feedback = None;
        self.test.start();
    }

    fn restart(&mut self) {
        self.typed.clear();
        self.feedback = None;
        self.test.restart();
    }

    fn handle_key(&mut self, key: &KeyEvent, _now: Instant) {
        if self.test.show_text() {
            let outcome = match key.code {
                KeyCode::Enter | KeyCode::Char('y') => self.test.confirm_reading(),
                KeyCode::Char('n') => self.test.cannot_read(),
                KeyCode::Char('t') => {
                    self.test.hide_text_and_ask_for_input();
                    None
                }
                _ => None,
            };
            if let Some(outcome) = outcome {
                self.feedback = Some(feedback_for(outcome.correct));
            }
            return;
        }

        if InputHandler::is_enter(key) {
            let typed = std::mem::take(&mut self.typed);
            if let Some(read_back) = self.test.submit_answer(&typed) {
                self.feedback = Some(feedback_for(read_back.outcome.correct));
            }
        } else if InputHandler::is_backspace(key) {
            self.typed.pop();
        } else if let Some(c) = InputHandler::key_to_char(key) {
            self.typed.push(c);
        }
    }

    fn frame(&self, ctx: &ScreenContext) -> Frame<'_> {
        let line = self.test.current_line();
        let label = format!(
            "{} ({} pt, near {})  |  font {:.1} px at {} cm",
            line.jaeger,
            line.point_size,
            line.snellen_near,
            self.test.font_size_px(&ctx.sizing),
            self.test.distance_cm()
        );

        let (stimulus, hint) = if self.test.show_text() {
            (
                Stimulus::Text(self.test.current_text().unwrap_or("")),
                "Enter/y readable  |  n not readable  |  t type it back  |  Esc restart",
            )
        } else {
            (
                Stimulus::ReadBack(&self.typed),
                "Enter submit  |  Esc restart  |  Ctrl+C quit",
            )
        };

        Frame {
            title: self.title(),
            line_label: Some(label),
            stimulus,
            size: None,
            progress: Some(ladder_progress(self.test.progress())),
            feedback: self.feedback,
            hint,
            theme: ctx.theme,
            margin_px: ctx.margin_px,
        }
    }

    fn text_entry(&self) -> bool {
        !self.test.show_text()
    }

    fn show_summary(&self, display: &Display) -> IoResult<()> {
        display.show_message(&self.summary_line())?;
        display.show_line_results(self.test.results())
    }

    fn summary_line(&self) -> String {
        match self.test.best_result() {
            Some(result) => format!(
                "{} finished: best line {} at {} cm",
                self.title(),
                result.line.jaeger,
                self.test.distance_cm()
            ),
            None => format!("{} finished: no line passed", self.title()),
        }
    }
}

pub struct IshiharaScreen {
    test: IshiharaTest,
    typed: String,
}

impl IshiharaScreen {
    pub fn new(test: IshiharaTest) -> Self {
        IshiharaScreen {
            test,
            typed: String::new(),
        }
    }

    pub fn test(&self) -> &IshiharaTest {
        &self.test
    }
}

impl Screen for IshiharaScreen {
    fn title(&self) -> &'static str {
        "Ishihara color plates"
    }

    fn phase(&self) -> TestPhase {
        self.test.phase()
    }

    fn start(&mut self) {
        self.typed.clear();
        self.test.start();
    }

    fn restart(&mut self) {
        self.typed.clear();
        self.test.restart();
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if self.test.showing_feedback() {
            return;
        }

        match key.code {
            KeyCode::Enter => {
                let typed = std::mem::take(&mut self.typed);
                self.test.submit_answer(&typed, now);
            }
            KeyCode::Tab => {
                self.typed.clear();
                self.test.cannot_see(now);
            }
            KeyCode::Right => {
                self.typed.clear();
                self.test.skip_plate(now);
            }
            KeyCode::Backspace => {
                self.typed.pop();
            }
            _ => {
                if let Some(c) = InputHandler::key_to_char(key) {
                    self.typed.push(c);
                }
            }
        }
    }

    fn tick(&mut self, now: Instant) -> bool {
        self.test.poll(now).is_some()
    }

    fn text_entry(&self) -> bool {
        true
    }

    fn frame(&self, ctx: &ScreenContext) -> Frame<'_> {
        let plate = self.test.current_plate();
        let progress = self.test.progress();
        let feedback = if self.test.showing_feedback() {
            self.test.last_answer().map(|a| feedback_for(a.is_correct))
        } else {
            None
        };

        Frame {
            title: self.title(),
            line_label: Some(format!("Choices: {}", plate_options(plate).join(" / "))),
            stimulus: Stimulus::Plate {
                id: plate.id,
                typed: &self.typed,
            },
            size: None,
            progress: Some(format!(
                "Plate {}/{} ({:.0}%)",
                progress.current, progress.total, progress.percentage
            )),
            feedback,
            hint: "Enter answer  |  Tab nothing visible  |  → skip  |  Esc restart",
            theme: ctx.theme,
            margin_px: ctx.margin_px,
        }
    }

    fn show_summary(&self, display: &Display) -> IoResult<()> {
        match self.test.result() {
            Some(result) => display.show_ishihara_result(&result),
            None => Ok(()),
        }
    }

    fn summary_line(&self) -> String {
        match self.test.result() {
            Some(result) => format!(
                "{} finished: {} ({}/{} correct, confidence {:.0}%)",
                self.title(),
                result.diagnosis,
                result.correct_count,
                result.total_count,
                result.confidence * 100.0
            ),
            None => format!("{} not finished", self.title()),
        }
    }
}

/// Keys with meaning outside a running test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellKey {
    Start,
    Quit,
    Back,
    Other,
}

pub fn shell_key(key: &KeyEvent) -> ShellKey {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => ShellKey::Quit,
        _ => match normalize_key(key) {
            Action::Confirm => ShellKey::Start,
            Action::Back => ShellKey::Back,
            _ => ShellKey::Other,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::display::stimulus_lines;
    use crate::optotype::ishihara::ISHIHARA_PLATES;
    use crate::optotype::Direction;
    use crate::session::{DirectionalOptotype, LadderConfig};
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx() -> ScreenContext {
        ScreenContext {
            sizing: SizingContext::new(3.0, 4.0, 1.0),
            margin_px: 24,
            theme: ChartTheme::Day,
        }
    }

    #[test]
    fn test_pediatric_keys() {
        assert_eq!(pediatric_symbol('1'), Some('●'));
        assert_eq!(pediatric_symbol('5'), Some('★'));
        assert_eq!(pediatric_symbol('0'), None);
        assert_eq!(pediatric_symbol('x'), None);
    }

    #[test]
    fn test_letter_screen_typing() {
        let test = LetterTest::with_seed(OptotypePool::Snellen, LadderConfig::default(), 9);
        let mut screen = LetterScreen::new(test);
        screen.start();

        let shown = screen.test().current_char().unwrap();
        screen.handle_key(&key(KeyCode::Char(shown.to_ascii_lowercase())), Instant::now());
        assert_eq!(screen.feedback, Some(Feedback::Correct));
        assert_eq!(screen.test().current_char_index(), 1);

        let frame = screen.frame(&ctx());
        assert!(matches!(frame.stimulus, Stimulus::Symbols(s) if s.len() == 1));
        assert!(frame.size.is_some());
    }

    #[test]
    fn test_jaeger_screen_read_back_mode() {
        let test = JaegerTest::with_seed(
            crate::optotype::TextLocale::English,
            crate::session::jaeger::JAEGER_DEFAULT_CONFIG,
            4,
        );
        let mut screen = JaegerScreen::new(test);
        screen.start();
        assert!(!screen.text_entry());

        let now = Instant::now();
        screen.handle_key(&key(KeyCode::Char('t')), now);
        assert!(screen.text_entry());

        let passage = screen.test().current_text().unwrap();
        for c in passage.chars() {
            screen.handle_key(&key(KeyCode::Char(c)), now);
        }
        screen.handle_key(&key(KeyCode::Enter), now);
        assert_eq!(screen.feedback, Some(Feedback::Correct));
        assert!(screen.typed.is_empty());
        assert!(!screen.text_entry());
    }

    #[test]
    fn test_ishihara_screen_flow() {
        let mut screen = IshiharaScreen::new(IshiharaTest::new(Some(2)));
        screen.start();
        let t0 = Instant::now();

        for c in ISHIHARA_PLATES[0].normal_answer.chars() {
            screen.handle_key(&key(KeyCode::Char(c)), t0);
        }
        screen.handle_key(&key(KeyCode::Enter), t0);
        assert!(screen.frame(&ctx()).feedback == Some(Feedback::Correct));

        // typing during feedback is dropped
        screen.handle_key(&key(KeyCode::Char('9')), t0);
        assert!(screen.typed.is_empty());

        assert!(screen.tick(t0 + Duration::from_millis(600)));
        screen.handle_key(&key(KeyCode::Tab), t0 + Duration::from_millis(700));
        assert!(screen.tick(t0 + Duration::from_millis(1300)));
        assert_eq!(screen.phase(), TestPhase::Finished);
        assert!(screen.summary_line().contains("1/2 correct"));
    }

    #[test]
    fn test_directional_frame_hides_answer() {
        for optotype in [DirectionalOptotype::TumblingE, DirectionalOptotype::LandoltRing] {
            let test = DirectionalTest::with_seed(optotype, LadderConfig::default(), 9);
            let mut screen = DirectionalScreen::new(test);
            screen.start();

            let now = Instant::now();
            for _ in 0..10 {
                let direction = screen.test.current_direction().unwrap();
                let degrees = format!("{}°", direction.rotation_degrees());
                let rows = stimulus_lines(&screen.frame(&ctx()).stimulus);
                assert_eq!(rows.len(), 5);
                for row in rows {
                    assert!(!row.contains(direction.arrow()));
                    assert!(!row.contains(&degrees));
                }

                let pressed = match direction {
                    Direction::Up => KeyCode::Up,
                    Direction::Down => KeyCode::Down,
                    Direction::Left => KeyCode::Left,
                    Direction::Right => KeyCode::Right,
                };
                screen.handle_key(&key(pressed), now);
                assert_eq!(screen.feedback, Some(Feedback::Correct));
            }
        }
    }

    #[test]
    fn test_ishihara_frame_hides_answer_key() {
        let mut screen = IshiharaScreen::new(IshiharaTest::new(None));
        screen.start();
        let mut now = Instant::now();

        while screen.phase() == TestPhase::Testing {
            let plate = screen.test().current_plate();
            let rows = stimulus_lines(&screen.frame(&ctx()).stimulus);
            assert_eq!(rows[0], format!("Plate {}", plate.id));
            for row in &rows {
                assert!(!row.contains(plate.description));
                assert!(!row.contains(':'));
            }

            screen.handle_key(&key(KeyCode::Tab), now);
            now += Duration::from_millis(600);
            screen.tick(now);
        }
        assert_eq!(screen.phase(), TestPhase::Finished);
    }

    #[test]
    fn test_shell_keys() {
        assert_eq!(shell_key(&key(KeyCode::Enter)), ShellKey::Start);
        assert_eq!(shell_key(&key(KeyCode::Char('q'))), ShellKey::Quit);
        assert_eq!(shell_key(&key(KeyCode::Esc)), ShellKey::Back);
        assert_eq!(shell_key(&key(KeyCode::Char('x'))), ShellKey::Other);
    }
}
