//! Acuity line reference table
//!
//! Ordered from the largest optotype (20/400) down to the smallest (20/10):
//! - ordinal strictly ascending
//! - logMAR strictly descending
//! - decimal VA strictly ascending

/// A row of any chart that can be ranked by logMAR.
pub trait ChartLine: Copy {
    /// logMAR of this line (smaller is better acuity)
    fn log_mar(&self) -> f64;

    /// Short label for display (Snellen fraction or Jaeger grade)
    fn label(&self) -> &'static str;
}

/// One line of the distance acuity chart
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcuityLine {
    pub ordinal: u8,
    pub log_mar: f64,
    pub snellen: &'static str,
    pub decimal_va: f64,
}

impl ChartLine for AcuityLine {
    fn log_mar(&self) -> f64 {
        self.log_mar
    }

    fn label(&self) -> &'static str {
        self.snellen
    }
}

pub static ACUITY_LINES: [AcuityLine; 12] = [
    AcuityLine { ordinal: 1, log_mar: 1.3, snellen: "20/400", decimal_va: 0.05 },
    AcuityLine { ordinal: 2, log_mar: 1.0, snellen: "20/200", decimal_va: 0.1 },
    AcuityLine { ordinal: 3, log_mar: 0.9, snellen: "20/160", decimal_va: 0.125 },
    AcuityLine { ordinal: 4, log_mar: 0.7, snellen: "20/100", decimal_va: 0.2 },
    AcuityLine { ordinal: 5, log_mar: 0.5, snellen: "20/63", decimal_va: 0.32 },
    AcuityLine { ordinal: 6, log_mar: 0.3, snellen: "20/40", decimal_va: 0.5 },
    AcuityLine { ordinal: 7, log_mar: 0.2, snellen: "20/32", decimal_va: 0.63 },
    AcuityLine { ordinal: 8, log_mar: 0.1, snellen: "20/25", decimal_va: 0.8 },
    AcuityLine { ordinal: 9, log_mar: 0.0, snellen: "20/20", decimal_va: 1.0 },
    AcuityLine { ordinal: 10, log_mar: -0.1, snellen: "20/16", decimal_va: 1.25 },
    AcuityLine { ordinal: 11, log_mar: -0.2, snellen: "20/12", decimal_va: 1.6 },
    AcuityLine { ordinal: 12, log_mar: -0.3, snellen: "20/10", decimal_va: 2.0 },
];
