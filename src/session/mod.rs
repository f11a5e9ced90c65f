//! Test sessions: line ladders, per-test state machines, and free charts
//!
//! # Components
//! - `state.rs`: LineLadder, the shared line-by-line progression
//! - `letters.rs`: Snellen letters and pediatric symbols
//! - `directional.rs`: Tumbling E and Landolt ring
//! - `jaeger.rs`: Near-vision reading with fuzzy read-back
//! - `similarity.rs`: Levenshtein similarity for typed read-back
//! - `ishihara.rs`: Color-plate walk with delayed advance
//! - `timer.rs`: Cancelable deferred transitions
//! - `chart.rs`: Examiner-led acuity and Jaeger charts

pub mod chart;
pub mod directional;
pub mod ishihara;
pub mod jaeger;
pub mod letters;
pub mod similarity;
pub mod state;
pub mod timer;

pub use chart::{AcuityChart, ChartCommand, ChartOptotype, ChartTheme, JaegerChart};
pub use directional::{DirectionalOptotype, DirectionalTest};
pub use ishihara::{IshiharaTest, PlateAdvance};
pub use jaeger::JaegerTest;
pub use letters::LetterTest;
pub use state::{AnswerOutcome, LadderConfig, LineLadder, LineResult, LineStep, Progress, TestPhase};
pub use timer::DeferredTransitions;
