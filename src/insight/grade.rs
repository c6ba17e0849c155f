use serde::{Serialize, Serializer};
use std::fmt;

/// Letter grade for a 0-100 transparency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    D,
    F,
}

/// Inclusive lower bound of each band, highest first.
const GRADE_BANDS: [(f64, Grade); 9] = [
    (93.0, Grade::A),
    (90.0, Grade::AMinus),
    (87.0, Grade::BPlus),
    (83.0, Grade::B),
    (80.0, Grade::BMinus),
    (77.0, Grade::CPlus),
    (73.0, Grade::C),
    (70.0, Grade::CMinus),
    (60.0, Grade::D),
];

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Map a raw score to its letter grade.
///
/// Compares the unrounded score, so 92.9 is an A- and not an A. Defined over
/// [0, 100]; callers validate the range (anything below 60, including NaN, is
/// an F).
pub fn score_to_grade(score: f64) -> Grade {
    GRADE_BANDS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F)
}

/// Pick the grade to show: a supplied non-blank grade wins over the computed one.
pub fn resolve_grade(supplied: Option<&str>, score: Option<f64>) -> Option<String> {
    match supplied.map(str::trim) {
        Some(grade) if !grade.is_empty() => Some(grade.to_string()),
        _ => score.map(|s| score_to_grade(s).to_string()),
    }
}
