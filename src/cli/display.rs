//! Terminal display and UI rendering
//!
//! Features:
//! - Optotype rendering (symbols, oriented glyphs, reading passages, plates)
//! - Physical size overlay for the current line
//! - Progress and answer feedback
//! - Per-line results and color-vision summary

use super::input::InputHandler;
use crate::optotype::ishihara::IshiharaResult;
use crate::optotype::{ChartLine, Direction, OptotypeSize};
use crate::session::{ChartTheme, DirectionalOptotype, LineResult};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Result as IoResult, Write};

/// Approximate width of one terminal cell, used to turn pixel margins into columns
const CELL_WIDTH_PX: u32 = 8;

pub fn margin_columns(margin_px: u32) -> u16 {
    (margin_px / CELL_WIDTH_PX).min(u16::MAX as u32) as u16
}

/// What goes in the middle of the screen
pub enum Stimulus<'a> {
    Symbols(&'a [char]),
    /// Drawn facing `direction`; the direction itself is never printed
    Oriented {
        optotype: DirectionalOptotype,
        direction: Direction,
    },
    Directions(&'a [Direction]),
    Text(&'a str),
    /// Passage hidden, typed read-back so far
    ReadBack(&'a str),
    /// Plate number and typed answer; the answer key stays off screen
    Plate { id: u8, typed: &'a str },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

pub struct Frame<'a> {
    pub title: &'a str,
    pub line_label: Option<String>,
    pub stimulus: Stimulus<'a>,
    pub size: Option<OptotypeSize>,
    pub progress: Option<String>,
    pub feedback: Option<Feedback>,
    pub hint: &'a str,
    pub theme: ChartTheme,
    pub margin_px: u32,
}

/// Terminal display manager
pub struct Display {
    use_alternate_screen: bool,
}

impl Display {
    /// Display without alternate screen, for plain command output
    pub fn simple() -> Self {
        Display {
            use_alternate_screen: false,
        }
    }

    /// Full-screen display for interactive runs
    pub fn interactive() -> IoResult<Self> {
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Display {
            use_alternate_screen: true,
        })
    }

    pub fn clear(&self) -> IoResult<()> {
        execute!(stdout(), terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Render one frame of a running test or chart
    pub fn render(&self, frame: &Frame<'_>) -> IoResult<()> {
        let mut stdout = stdout();
        let (fg, bg) = theme_colors(frame.theme);
        let left = margin_columns(frame.margin_px);
        let top = (left / 2).max(1);

        execute!(
            stdout,
            SetBackgroundColor(bg),
            SetForegroundColor(fg),
            terminal::Clear(ClearType::All),
            cursor::MoveTo(left, top),
            Print(frame.title),
        )?;

        let mut row = top + 2;
        if let Some(label) = &frame.line_label {
            execute!(stdout, cursor::MoveTo(left, row), Print(label))?;
            row += 1;
        }
        if let Some(size) = &frame.size {
            execute!(
                stdout,
                cursor::MoveTo(left, row),
                SetForegroundColor(Color::DarkGrey),
                Print(format_size(size)),
                SetForegroundColor(fg),
            )?;
            row += 1;
        }

        row += 1;
        for text in stimulus_lines(&frame.stimulus) {
            execute!(stdout, cursor::MoveTo(left, row), Print(text))?;
            row += 1;
        }

        if let Some(feedback) = frame.feedback {
            let (color, text) = match feedback {
                Feedback::Correct => (Color::Green, "✓ correct"),
                Feedback::Incorrect => (Color::Red, "✗ incorrect"),
            };
            execute!(
                stdout,
                cursor::MoveTo(left, row + 1),
                SetForegroundColor(color),
                Print(text),
                SetForegroundColor(fg),
            )?;
        }
        row += 3;

        if let Some(progress) = &frame.progress {
            execute!(stdout, cursor::MoveTo(left, row), Print(progress))?;
            row += 1;
        }

        execute!(
            stdout,
            cursor::MoveTo(left, row + 1),
            SetForegroundColor(Color::DarkGrey),
            Print(frame.hint),
            ResetColor,
        )?;
        stdout.flush()
    }

    /// Per-line outcome table after a ladder test
    pub fn show_line_results<L: ChartLine>(&self, results: &[LineResult<L>]) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            SetForegroundColor(Color::Blue),
            Print("─".repeat(40)),
            Print("\r\n"),
            ResetColor,
        )?;

        for result in results {
            let color = if result.passed { Color::Green } else { Color::Red };
            execute!(
                stdout,
                Print(format!("{:<8}", result.line.label())),
                SetForegroundColor(color),
                Print(if result.passed { "passed" } else { "failed" }),
                ResetColor,
                Print(format!(
                    "  {}/{} correct\r\n",
                    result.correct_count, result.total_attempts
                )),
            )?;
        }
        stdout.flush()
    }

    pub fn show_ishihara_result(&self, result: &IshiharaResult) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            SetForegroundColor(Color::Blue),
            Print("─".repeat(40)),
            Print("\r\n"),
            ResetColor,
            Print(format!("{}\r\n", result.description())),
            Print(format!(
                "Plates correct: {}/{}  |  Error rate: {:.0}%  |  Confidence: {:.0}%\r\n",
                result.correct_count,
                result.total_count,
                result.error_rate * 100.0,
                result.confidence * 100.0
            )),
            SetForegroundColor(Color::DarkGrey),
            Print("Screening aid only, not a medical diagnosis.\r\n"),
            ResetColor,
        )?;
        stdout.flush()
    }

    pub fn show_message(&self, message: &str) -> IoResult<()> {
        let mut stdout = stdout();
        execute!(stdout, Print(message), Print("\r\n"))?;
        stdout.flush()
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&self) -> IoResult<()> {
        if self.use_alternate_screen {
            execute!(stdout(), ResetColor, LeaveAlternateScreen, cursor::Show)?;
        }
        InputHandler::disable_raw_mode()
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}

fn theme_colors(theme: ChartTheme) -> (Color, Color) {
    match theme {
        ChartTheme::Day => (Color::Black, Color::White),
        ChartTheme::Night => (Color::White, Color::Black),
    }
}

pub fn format_size(size: &OptotypeSize) -> String {
    format!(
        "height {:.2} mm | {:.1} px | font {:.1} px",
        size.height_mm, size.height_px, size.font_size_px
    )
}

/// Text rows for a stimulus
pub fn stimulus_lines(stimulus: &Stimulus<'_>) -> Vec<String> {
    match stimulus {
        Stimulus::Symbols(symbols) => vec![spaced(symbols.iter().copied())],
        Stimulus::Oriented {
            optotype,
            direction,
        } => optotype_rows(*optotype, *direction)
            .iter()
            .map(|row| block_row(row))
            .collect(),
        Stimulus::Directions(directions) => vec![spaced(directions.iter().map(Direction::arrow))],
        Stimulus::Text(text) => vec![text.to_string()],
        Stimulus::ReadBack(typed) => vec![
            "Type what you read, then press Enter:".to_string(),
            format!("> {}", typed),
        ],
        Stimulus::Plate { id, typed } => vec![
            format!("Plate {}", id),
            format!("What do you see? > {}", typed),
        ],
    }
}

// 5x5 bitmaps, '#' filled. The E prongs and the ring gap face the direction.
const E_RIGHT: [&str; 5] = ["#####", "#....", "#####", "#....", "#####"];
const E_LEFT: [&str; 5] = ["#####", "....#", "#####", "....#", "#####"];
const E_DOWN: [&str; 5] = ["#####", "#.#.#", "#.#.#", "#.#.#", "#.#.#"];
const E_UP: [&str; 5] = ["#.#.#", "#.#.#", "#.#.#", "#.#.#", "#####"];
const RING_RIGHT: [&str; 5] = [".###.", "#...#", "#....", "#...#", ".###."];
const RING_LEFT: [&str; 5] = [".###.", "#...#", "....#", "#...#", ".###."];
const RING_DOWN: [&str; 5] = [".###.", "#...#", "#...#", "#...#", ".#.#."];
const RING_UP: [&str; 5] = [".#.#.", "#...#", "#...#", "#...#", ".###."];

fn optotype_rows(optotype: DirectionalOptotype, direction: Direction) -> &'static [&'static str; 5] {
    match (optotype, direction) {
        (DirectionalOptotype::TumblingE, Direction::Right) => &E_RIGHT,
        (DirectionalOptotype::TumblingE, Direction::Left) => &E_LEFT,
        (DirectionalOptotype::TumblingE, Direction::Down) => &E_DOWN,
        (DirectionalOptotype::TumblingE, Direction::Up) => &E_UP,
        (DirectionalOptotype::LandoltRing, Direction::Right) => &RING_RIGHT,
        (DirectionalOptotype::LandoltRing, Direction::Left) => &RING_LEFT,
        (DirectionalOptotype::LandoltRing, Direction::Down) => &RING_DOWN,
        (DirectionalOptotype::LandoltRing, Direction::Up) => &RING_UP,
    }
}

// Two cells per pixel keep the glyph roughly square
fn block_row(bits: &str) -> String {
    bits.chars()
        .map(|bit| if bit == '#' { "██" } else { "  " })
        .collect()
}

fn spaced(chars: impl Iterator<Item = char>) -> String {
    chars
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("   ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optotype::DIRECTIONS;

    #[test]
    fn test_margin_columns() {
        assert_eq!(margin_columns(48), 6);
        assert_eq!(margin_columns(24), 3);
        assert_eq!(margin_columns(16), 2);
    }

    #[test]
    fn test_symbol_row() {
        let lines = stimulus_lines(&Stimulus::Symbols(&['E', 'F', 'P']));
        assert_eq!(lines, vec!["E   F   P".to_string()]);
    }

    #[test]
    fn test_oriented_glyph_hides_direction() {
        for optotype in [DirectionalOptotype::TumblingE, DirectionalOptotype::LandoltRing] {
            let drawn: Vec<Vec<String>> = DIRECTIONS
                .iter()
                .map(|&direction| stimulus_lines(&Stimulus::Oriented { optotype, direction }))
                .collect();

            for (rows, direction) in drawn.iter().zip(DIRECTIONS) {
                assert_eq!(rows.len(), 5);
                for row in rows {
                    assert!(!row.contains(direction.arrow()));
                    assert!(!row.contains('°'));
                    assert!(!row.chars().any(|c| c.is_ascii_digit()));
                }
            }

            // every orientation draws differently
            for i in 0..drawn.len() {
                for j in i + 1..drawn.len() {
                    assert_ne!(drawn[i], drawn[j]);
                }
            }
        }
    }

    #[test]
    fn test_tumbling_e_opens_toward_direction() {
        let right = stimulus_lines(&Stimulus::Oriented {
            optotype: DirectionalOptotype::TumblingE,
            direction: Direction::Right,
        });
        assert_eq!(right[1], "██        ");
        let left = stimulus_lines(&Stimulus::Oriented {
            optotype: DirectionalOptotype::TumblingE,
            direction: Direction::Left,
        });
        assert_eq!(left[1], "        ██");
    }

    #[test]
    fn test_plate_row_shows_number_only() {
        let lines = stimulus_lines(&Stimulus::Plate { id: 2, typed: "8" });
        assert_eq!(lines, vec!["Plate 2".to_string(), "What do you see? > 8".to_string()]);
    }

    #[test]
    fn test_format_size() {
        let size = OptotypeSize {
            height_mm: 4.36,
            height_px: 13.09,
            font_size_px: 22.9,
        };
        assert_eq!(format_size(&size), "height 4.36 mm | 13.1 px | font 22.9 px");
    }
}
