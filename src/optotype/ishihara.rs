//! Ishihara color-vision plates: answer key and result classifier
//!
//! Only the answers are modelled here; plate artwork belongs to the renderer.
//! The classifier is a screening aid, not a medical determination: any
//! non-normal outcome should be followed by a professional examination.

use rustc_hash::FxHashMap;
use std::fmt;

/// How a plate behaves for red-green deficient observers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlateType {
    /// Everyone sees the same figure
    Demonstration,
    /// Deficient observers see a different figure
    Transformation,
    /// Deficient observers see nothing
    Vanishing,
    /// Only deficient observers see a figure
    Hidden,
    /// Separates protan from deutan responses
    Diagnostic,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IshiharaPlate {
    pub id: u8,
    pub plate_type: PlateType,
    pub normal_answer: &'static str,
    pub color_blind_answer: &'static str,
    pub protan_answer: Option<&'static str>,
    pub deutan_answer: Option<&'static str>,
    pub description: &'static str,
}

const fn plate(
    id: u8,
    plate_type: PlateType,
    normal_answer: &'static str,
    color_blind_answer: &'static str,
    description: &'static str,
) -> IshiharaPlate {
    IshiharaPlate {
        id,
        plate_type,
        normal_answer,
        color_blind_answer,
        protan_answer: None,
        deutan_answer: None,
        description,
    }
}

const fn split_plate(
    id: u8,
    plate_type: PlateType,
    normal_answer: &'static str,
    color_blind_answer: &'static str,
    protan_answer: &'static str,
    deutan_answer: &'static str,
    description: &'static str,
) -> IshiharaPlate {
    IshiharaPlate {
        id,
        plate_type,
        normal_answer,
        color_blind_answer,
        protan_answer: Some(protan_answer),
        deutan_answer: Some(deutan_answer),
        description,
    }
}

use PlateType::{Demonstration, Diagnostic, Hidden, Transformation, Vanishing};

/// Answer key of the 38-plate edition (numeral and tracing plates used here)
pub static ISHIHARA_PLATES: [IshiharaPlate; 31] = [
    plate(1, Demonstration, "12", "12", "Demonstration plate, everyone sees 12"),
    plate(2, Vanishing, "8", "", "8, invisible with red-green deficiency"),
    plate(3, Vanishing, "6", "", "6, invisible with red-green deficiency"),
    plate(4, Vanishing, "29", "", "29, invisible with red-green deficiency"),
    plate(5, Vanishing, "57", "", "57, invisible with red-green deficiency"),
    plate(6, Vanishing, "5", "", "5, invisible with red-green deficiency"),
    plate(7, Vanishing, "3", "", "3, invisible with red-green deficiency"),
    plate(8, Vanishing, "15", "", "15, invisible with red-green deficiency"),
    plate(9, Vanishing, "74", "", "74, invisible with red-green deficiency"),
    split_plate(10, Transformation, "2", "", "", "6", "2 normal; invisible to protans, 6 for deutans"),
    split_plate(11, Transformation, "6", "", "5", "", "6 normal; 5 for protans, invisible to deutans"),
    plate(12, Vanishing, "97", "", "97, invisible with red-green deficiency"),
    plate(13, Transformation, "45", "", "45 normal; invisible with deficiency"),
    plate(14, Transformation, "5", "", "5 normal; invisible with deficiency"),
    plate(15, Vanishing, "7", "", "7, invisible with red-green deficiency"),
    plate(16, Vanishing, "16", "", "16, invisible with red-green deficiency"),
    plate(17, Hidden, "", "5", "Invisible to normal vision; 5 with red-green deficiency"),
    plate(18, Transformation, "73", "", "73 normal; invisible with deficiency"),
    split_plate(19, Diagnostic, "", "", "2", "", "Invisible to normal and deutans; 2 for protans"),
    split_plate(20, Diagnostic, "", "", "", "2", "Invisible to normal and protans; 2 for deutans"),
    plate(21, Transformation, "45", "", "45 normal; invisible with deficiency"),
    split_plate(22, Diagnostic, "26", "6", "2", "6", "26 normal; 2 for protans, 6 for deutans"),
    split_plate(23, Diagnostic, "42", "2", "4", "2", "42 normal; 4 for protans, 2 for deutans"),
    split_plate(24, Diagnostic, "35", "5", "3", "5", "35 normal; 3 for protans, 5 for deutans"),
    split_plate(25, Diagnostic, "96", "6", "9", "6", "96 normal; 9 for protans, 6 for deutans"),
    plate(26, Diagnostic, "purple-line", "red-line", "Purple trace (normal) or red trace (deficient)"),
    plate(27, Diagnostic, "purple-line", "red-line", "Purple trace (normal) or red trace (deficient)"),
    plate(28, Diagnostic, "orange-line", "blue-line", "Orange trace (normal) or blue trace (deficient)"),
    plate(29, Diagnostic, "orange-line", "blue-line", "Orange trace (normal) or blue trace (deficient)"),
    plate(30, Diagnostic, "orange-line", "blue-line", "Orange trace (normal) or blue trace (deficient)"),
    plate(31, Diagnostic, "orange-line", "blue-line", "Orange trace (normal) or blue trace (deficient)"),
];

impl IshiharaPlate {
    /// Tracing plates ask for a line instead of a numeral
    pub fn is_tracing(&self) -> bool {
        self.normal_answer.ends_with("-line")
    }

    /// Non-empty answers accepted for this plate
    pub fn accepted_answers(&self) -> Vec<&'static str> {
        [
            Some(self.normal_answer),
            Some(self.color_blind_answer),
            self.protan_answer,
            self.deutan_answer,
        ]
        .into_iter()
        .flatten()
        .filter(|a| !a.is_empty())
        .collect()
    }
}

/// Whether `answer` is a recognised reading of `plate` (normal or deficient)
pub fn check_answer(plate: &IshiharaPlate, answer: &str) -> bool {
    let answer = answer.trim();

    if plate.plate_type == PlateType::Demonstration {
        return answer == plate.normal_answer;
    }

    plate.accepted_answers().contains(&answer)
}

/// Answer choices for a selection UI, including distractors (at most 8)
pub fn plate_options(plate: &IshiharaPlate) -> Vec<String> {
    if plate.is_tracing() {
        return vec!["trace line".to_string()];
    }

    let mut options: Vec<String> = Vec::new();
    let mut push = |value: String| {
        if !options.contains(&value) {
            options.push(value);
        }
    };

    for answer in plate.accepted_answers() {
        push(answer.to_string());
    }

    if matches!(plate.plate_type, PlateType::Vanishing | PlateType::Hidden)
        || plate.color_blind_answer.is_empty()
    {
        push(String::new());
    }

    let digits: Vec<char> = plate.normal_answer.chars().collect();
    if digits.len() == 2 {
        push(format!("{}{}", digits[1], digits[0]));
    }
    for digit in digits.iter().filter_map(|c| c.to_digit(10)) {
        if digit > 0 {
            push((digit - 1).to_string());
        }
        if digit < 9 {
            push((digit + 1).to_string());
        }
    }

    options.truncate(8);
    options
}

/// One recorded response, with a snapshot of the plate it answered
#[derive(Clone, Debug, PartialEq)]
pub struct PlateAnswer {
    pub plate_id: u8,
    /// Typed answer with surrounding whitespace trimmed
    pub user_answer: String,
    pub is_correct: bool,
    pub plate: IshiharaPlate,
}

/// Red-green deficiency family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeficiencyKind {
    Protan,
    Deutan,
    /// Red-green pattern without a protan/deutan preference
    RedGreen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Anomaly,
    Dichromacy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnosis {
    Normal,
    Deficiency {
        kind: DeficiencyKind,
        severity: Severity,
    },
    Inconclusive,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Diagnosis::Normal => "normal color vision",
            Diagnosis::Inconclusive => "inconclusive",
            Diagnosis::Deficiency { kind, severity } => match (kind, severity) {
                (DeficiencyKind::Protan, Severity::Anomaly) => "possible protanomaly",
                (DeficiencyKind::Protan, Severity::Dichromacy) => "possible protanopia",
                (DeficiencyKind::Deutan, Severity::Anomaly) => "possible deuteranomaly",
                (DeficiencyKind::Deutan, Severity::Dichromacy) => "possible deuteranopia",
                (DeficiencyKind::RedGreen, Severity::Anomaly) => "possible red-green anomaly",
                (DeficiencyKind::RedGreen, Severity::Dichromacy) => "possible red-green dichromacy",
            },
        };
        write!(f, "{}", name)
    }
}

/// Cut-offs of the classifier, all as fractions in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagnosisThresholds {
    /// Error rate at or below which vision is reported normal
    pub normal_max_error_rate: f64,
    /// Share of split (protan/deutan keyed) plates that must carry one family's
    /// reading before that family is named
    pub type_min_match_share: f64,
    /// Error rate at or above which a deficiency is graded dichromacy
    pub dichromacy_min_error_rate: f64,
}

impl Default for DiagnosisThresholds {
    fn default() -> Self {
        DiagnosisThresholds {
            normal_max_error_rate: 0.1,
            type_min_match_share: 0.3,
            dichromacy_min_error_rate: 0.4,
        }
    }
}

/// Classifier output
#[derive(Clone, Debug, PartialEq)]
pub struct IshiharaResult {
    pub diagnosis: Diagnosis,
    pub confidence: f64,
    pub error_rate: f64,
    pub protan_matches: u32,
    pub deutan_matches: u32,
    pub correct_count: usize,
    pub total_count: usize,
}

impl IshiharaResult {
    pub fn description(&self) -> &'static str {
        match self.diagnosis {
            Diagnosis::Normal => "Normal color vision",
            Diagnosis::Inconclusive => {
                "Inconclusive results - a professional evaluation is recommended"
            }
            Diagnosis::Deficiency { kind, .. } => match kind {
                DeficiencyKind::Protan => "Possible red-cone (protan) deficiency",
                DeficiencyKind::Deutan => "Possible green-cone (deutan) deficiency",
                DeficiencyKind::RedGreen => "Possible red-green deficiency (type not determined)",
            },
        }
    }
}

/// Rule-based screening classifier over the accumulated answers
pub fn analyze_results(answers: &[PlateAnswer], thresholds: &DiagnosisThresholds) -> IshiharaResult {
    let total = answers.len();
    let correct_count = answers.iter().filter(|a| a.is_correct).count();

    let mut errors = 0u32;
    let mut protan_matches = 0u32;
    let mut deutan_matches = 0u32;
    let mut keyed_plates = 0u32;
    let mut errors_by_type: FxHashMap<PlateType, u32> = FxHashMap::default();
    let mut plates_by_type: FxHashMap<PlateType, u32> = FxHashMap::default();

    for answer in answers {
        let given = answer.user_answer.trim();
        let plate = &answer.plate;

        *plates_by_type.entry(plate.plate_type).or_insert(0) += 1;
        if plate.protan_answer.is_some() || plate.deutan_answer.is_some() {
            keyed_plates += 1;
        }

        if given == plate.normal_answer {
            continue;
        }

        errors += 1;
        *errors_by_type.entry(plate.plate_type).or_insert(0) += 1;

        if plate.protan_answer == Some(given) {
            protan_matches += 1;
        }
        if plate.deutan_answer == Some(given) {
            deutan_matches += 1;
        }
    }

    let mut result = IshiharaResult {
        diagnosis: Diagnosis::Inconclusive,
        confidence: 0.0,
        error_rate: 0.0,
        protan_matches,
        deutan_matches,
        correct_count,
        total_count: total,
    };

    if total == 0 {
        return result;
    }

    let error_rate = errors as f64 / total as f64;
    result.error_rate = error_rate;

    if error_rate <= thresholds.normal_max_error_rate {
        result.diagnosis = Diagnosis::Normal;
        result.confidence = 1.0 - error_rate;
        return result;
    }

    let share = |count: u32, of: u32| {
        if of == 0 {
            0.0
        } else {
            count as f64 / of as f64
        }
    };

    let typed_share = share(protan_matches.max(deutan_matches), keyed_plates);
    let vanishing_errors = errors_by_type
        .get(&PlateType::Vanishing)
        .copied()
        .unwrap_or(0);
    let vanishing_plates = plates_by_type
        .get(&PlateType::Vanishing)
        .copied()
        .unwrap_or(0);

    // Equal protan/deutan counts fall through to the vanishing-plate tally
    let (kind, confidence) = if protan_matches != deutan_matches
        && typed_share >= thresholds.type_min_match_share
    {
        if protan_matches > deutan_matches {
            (DeficiencyKind::Protan, typed_share)
        } else {
            (DeficiencyKind::Deutan, typed_share)
        }
    } else if vanishing_errors > 0 {
        (
            DeficiencyKind::RedGreen,
            share(vanishing_errors, vanishing_plates),
        )
    } else {
        result.confidence = 0.5;
        return result;
    };

    let severity = if error_rate >= thresholds.dichromacy_min_error_rate {
        Severity::Dichromacy
    } else {
        Severity::Anomaly
    };

    result.diagnosis = Diagnosis::Deficiency { kind, severity };
    result.confidence = confidence;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(plate: &IshiharaPlate, given: &str) -> PlateAnswer {
        PlateAnswer {
            plate_id: plate.id,
            user_answer: given.to_string(),
            is_correct: check_answer(plate, given),
            plate: *plate,
        }
    }

    fn answers_with(f: impl Fn(&IshiharaPlate) -> &'static str) -> Vec<PlateAnswer> {
        ISHIHARA_PLATES.iter().map(|p| answer(p, f(p))).collect()
    }

    #[test]
    fn test_check_answer() {
        let demo = &ISHIHARA_PLATES[0];
        assert!(check_answer(demo, "12"));
        assert!(check_answer(demo, " 12 "));
        assert!(!check_answer(demo, ""));

        let split = &ISHIHARA_PLATES[9];
        assert!(check_answer(split, "2"));
        assert!(check_answer(split, "6"));
        assert!(!check_answer(split, "7"));
        assert!(!check_answer(split, ""));
    }

    #[test]
    fn test_plate_options() {
        let opts = plate_options(&ISHIHARA_PLATES[3]);
        assert_eq!(opts[0], "29");
        assert!(opts.contains(&String::new()));
        assert!(opts.contains(&"92".to_string()));
        assert!(opts.len() <= 8);

        assert_eq!(plate_options(&ISHIHARA_PLATES[27]), vec!["trace line".to_string()]);
    }

    #[test]
    fn test_all_normal_answers() {
        let answers = answers_with(|p| p.normal_answer);
        let result = analyze_results(&answers, &DiagnosisThresholds::default());
        assert_eq!(result.diagnosis, Diagnosis::Normal);
        assert_eq!(result.error_rate, 0.0);
        assert_eq!(result.total_count, 31);
    }

    #[test]
    fn test_deutan_pattern() {
        let answers = answers_with(|p| match p.deutan_answer {
            Some(d) => d,
            None if p.plate_type == PlateType::Demonstration => p.normal_answer,
            None => p.color_blind_answer,
        });
        let result = analyze_results(&answers, &DiagnosisThresholds::default());
        assert_eq!(
            result.diagnosis,
            Diagnosis::Deficiency {
                kind: DeficiencyKind::Deutan,
                severity: Severity::Dichromacy
            }
        );
        assert!(result.deutan_matches > result.protan_matches);
    }

    #[test]
    fn test_vanishing_only_errors_break_tie() {
        let answers = answers_with(|p| {
            if p.plate_type == PlateType::Vanishing {
                ""
            } else {
                p.normal_answer
            }
        });
        let result = analyze_results(&answers, &DiagnosisThresholds::default());
        assert_eq!(
            result.diagnosis,
            Diagnosis::Deficiency {
                kind: DeficiencyKind::RedGreen,
                severity: Severity::Anomaly
            }
        );
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_tie_without_vanishing_errors_is_inconclusive() {
        let answers = answers_with(|p| {
            if p.is_tracing() {
                p.color_blind_answer
            } else {
                p.normal_answer
            }
        });
        let result = analyze_results(&answers, &DiagnosisThresholds::default());
        assert_eq!(result.diagnosis, Diagnosis::Inconclusive);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_empty_answers() {
        let result = analyze_results(&[], &DiagnosisThresholds::default());
        assert_eq!(result.diagnosis, Diagnosis::Inconclusive);
        assert_eq!(result.total_count, 0);
    }
}
