use serde::{Deserialize, Serialize};
use std::fmt;

use crate::records::DataCoverageStatus;

/// Coarse trust signal for a report. Not a statistical interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Thresholds on the 0-8 coverage score: >= 7 High, >= 4 Medium
    pub fn from_points(points: u8) -> Self {
        if points >= 7 {
            Confidence::High
        } else if points >= 4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Additive coverage score in 0..=8.
///
/// One point per true coverage flag, plus 2 for five or more sources or 1 for
/// two or more. A negative source count earns nothing.
pub fn confidence_points(status: &DataCoverageStatus) -> u8 {
    let flag_points = status.flags().iter().filter(|&&flag| flag).count() as u8;

    let source_points = match status.sources_count {
        n if n >= 5 => 2,
        n if n >= 2 => 1,
        _ => 0,
    };

    flag_points + source_points
}

/// Confidence label for a municipality. No coverage metadata means Low.
pub fn score_confidence(status: Option<&DataCoverageStatus>) -> Confidence {
    match status {
        Some(status) => Confidence::from_points(confidence_points(status)),
        None => Confidence::Low,
    }
}
