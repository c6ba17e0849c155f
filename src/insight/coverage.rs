use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::confidence_points;
use super::sanitize::Sanitizer;
use crate::records::DataCoverageStatus;

/// Human label for a missing-data code. Unknown codes pass through verbatim.
fn missing_label(code: &str) -> &str {
    match code {
        "opra" => "OPRA responsiveness",
        "audits" => "Audit data",
        "contracts" => "Contracts",
        "population" => "Population",
        other => other,
    }
}

/// Render missing-data codes as a comma-separated list, or "None".
pub fn pretty_missing<S: AsRef<str>>(codes: &[S]) -> String {
    if codes.is_empty() {
        return "None".to_string();
    }

    codes
        .iter()
        .map(|code| missing_label(code.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Coverage facts shown next to the confidence label.
///
/// A count is `None` when the stored value was invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageDetail {
    pub metrics_filled: Option<u32>,
    pub metrics_total: Option<u32>,
    pub sources_count: Option<u32>,
    pub last_updated_at: DateTime<Utc>,
    pub missing: String,
    pub points: u8,
    /// `last_updated_at` is further behind the report date than the stale window
    pub stale: bool,
}

impl CoverageDetail {
    pub fn from_status(
        status: &DataCoverageStatus,
        as_of: NaiveDate,
        stale_after: chrono::Duration,
        sanitizer: &mut Sanitizer,
    ) -> Self {
        Self {
            metrics_filled: sanitizer.count(
                "coverage",
                "metrics_filled_count",
                status.metrics_filled_count,
            ),
            metrics_total: sanitizer.count(
                "coverage",
                "metrics_total_count",
                status.metrics_total_count,
            ),
            sources_count: sanitizer.count("coverage", "sources_count", status.sources_count),
            last_updated_at: status.last_updated_at,
            missing: pretty_missing(&status.missing),
            points: confidence_points(status),
            stale: is_stale(status.last_updated_at, as_of, stale_after),
        }
    }
}

/// Compared at day granularity; updates dated after `as_of` are never stale.
pub fn is_stale(last_updated_at: DateTime<Utc>, as_of: NaiveDate, stale_after: chrono::Duration) -> bool {
    let age = as_of.signed_duration_since(last_updated_at.date_naive());
    age > stale_after
}
