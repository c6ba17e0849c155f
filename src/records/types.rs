use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A municipality as stored by the upstream data store.
///
/// `population` is kept signed so malformed rows (negative counts) survive
/// deserialization and can be reported instead of failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityProfile {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
}

impl MunicipalityProfile {
    /// "Name, County" when the county is known, otherwise just the name
    pub fn display_name(&self) -> String {
        match self.county.as_deref() {
            Some(county) if !county.trim().is_empty() => format!("{}, {}", self.name, county),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub year: i32,
    pub total_budget_usd: f64,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Rolled-up corruption and waste figures for one municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorruptionSummary {
    pub total_lost_usd: f64,
    /// `None` when recoveries were never reported; a known zero is `Some(0.0)`
    #[serde(default)]
    pub total_recovered_usd: Option<f64>,
    /// Upstream estimate; derived from `total_lost_usd` when absent
    #[serde(default)]
    pub estimated_jobs_lost: Option<f64>,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransparencyScoreRecord {
    pub score_year: i32,
    pub score: f64,
    /// Authoritative letter grade; wins over the one computed from `score`
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Which raw input categories exist for a municipality and how complete they are.
///
/// Counts are signed for the same reason as `MunicipalityProfile::population`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCoverageStatus {
    pub last_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub has_meetings: bool,
    #[serde(default)]
    pub has_meeting_documents: bool,
    #[serde(default)]
    pub has_contracts: bool,
    #[serde(default)]
    pub has_opra_metrics: bool,
    #[serde(default)]
    pub has_audit_data: bool,
    #[serde(default)]
    pub has_population: bool,
    #[serde(default)]
    pub sources_count: i64,
    #[serde(default)]
    pub metrics_filled_count: i64,
    #[serde(default)]
    pub metrics_total_count: i64,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl DataCoverageStatus {
    /// The six coverage flags in a fixed order
    pub fn flags(&self) -> [bool; 6] {
        [
            self.has_meetings,
            self.has_meeting_documents,
            self.has_contracts,
            self.has_opra_metrics,
            self.has_audit_data,
            self.has_population,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}
