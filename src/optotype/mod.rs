//! Optotype Module: reference tables, sizing geometry and symbol generation
//!
//! # Components
//! - `lines.rs`: Distance acuity table (logMAR ↔ Snellen ↔ decimal VA)
//! - `geometry.rs`: logMAR + distance + px/mm → on-screen size
//! - `generator.rs`: No-immediate-repeat symbol and direction streams
//! - `jaeger.rs`: Near-vision table and reading passages
//! - `ishihara.rs`: Color plate answer key and screening classifier

pub mod generator;
pub mod geometry;
pub mod ishihara;
pub mod jaeger;
pub mod lines;

pub use generator::{Direction, OptotypePool, DIRECTIONS};
pub use geometry::{optotype_size, OptotypeSize, SizeCheck};
pub use jaeger::{JaegerLine, TextLocale, JAEGER_LINES};
pub use lines::{AcuityLine, ChartLine, ACUITY_LINES};
