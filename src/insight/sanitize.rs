//! Malformed numeric fields are logged and treated as absent so one bad
//! value degrades a single metric instead of failing the whole report.

use std::fmt;
use tracing::warn;

/// A raw field that failed validation and was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidField {
    pub record: &'static str,
    pub field: &'static str,
    pub detail: String,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.record, self.field, self.detail)
    }
}

/// Collects every invalid field seen while building one report.
#[derive(Debug, Default)]
pub struct Sanitizer {
    invalid: Vec<InvalidField>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, record: &'static str, field: &'static str, detail: String) {
        warn!(record, field, %detail, "treating invalid field as absent");
        self.invalid.push(InvalidField {
            record,
            field,
            detail,
        });
    }

    /// Populations must be non-negative.
    pub fn population(&mut self, raw: Option<i64>) -> Option<u64> {
        let value = raw?;
        match u64::try_from(value) {
            Ok(p) => Some(p),
            Err(_) => {
                self.reject("municipality", "population", format!("negative value {}", value));
                None
            }
        }
    }

    /// Currency amounts must be finite and non-negative.
    pub fn amount(&mut self, record: &'static str, field: &'static str, raw: f64) -> Option<f64> {
        if !raw.is_finite() {
            self.reject(record, field, format!("non-finite value {}", raw));
            None
        } else if raw < 0.0 {
            self.reject(record, field, format!("negative amount {}", raw));
            None
        } else {
            Some(raw)
        }
    }

    pub fn optional_amount(
        &mut self,
        record: &'static str,
        field: &'static str,
        raw: Option<f64>,
    ) -> Option<f64> {
        raw.and_then(|value| self.amount(record, field, value))
    }

    /// Counts must be non-negative and fit in a `u32`.
    pub fn count(&mut self, record: &'static str, field: &'static str, raw: i64) -> Option<u32> {
        match u32::try_from(raw) {
            Ok(n) => Some(n),
            Err(_) if raw < 0 => {
                self.reject(record, field, format!("negative count {}", raw));
                None
            }
            Err(_) => {
                self.reject(record, field, format!("count {} out of range", raw));
                None
            }
        }
    }

    /// Transparency scores must lie in [0, 100].
    pub fn score(&mut self, raw: f64) -> Option<f64> {
        if raw.is_finite() && (0.0..=100.0).contains(&raw) {
            Some(raw)
        } else {
            self.reject("transparency_score", "score", format!("{} is outside 0-100", raw));
            None
        }
    }

    pub fn into_invalid(self) -> Vec<InvalidField> {
        self.invalid
    }
}
