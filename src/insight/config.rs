use serde::{Deserialize, Serialize};

/// Cost of one notional local job: salary + benefits + training.
pub const DEFAULT_JOB_COST_USD: f64 = 120_000.0;

/// Average persons per household. A documented approximation, not a census figure.
pub const DEFAULT_AVG_HOUSEHOLD_SIZE: f64 = 2.6;

/// Coverage older than this (relative to the report date) is flagged stale.
pub const DEFAULT_STALE_AFTER: &str = "180days";

/// Derivation settings for town insights.
///
/// Every field is optional; missing fields fall back to the defaults above.
///
/// Example YAML:
/// ```yaml
/// insight:
///   job_cost_usd: 120000
///   avg_household_size: 2.6
///   stale_after: "180days"
///   examples:
///     - { label: "Teacher salaries", usd_per_unit: 65000, note: "one school year" }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InsightConfig {
    #[serde(default)]
    pub job_cost_usd: Option<f64>,

    #[serde(default)]
    pub avg_household_size: Option<f64>,

    /// humantime duration, e.g. "90days" or "26weeks"
    #[serde(default)]
    pub stale_after: Option<String>,

    /// Templates for the "what this means in real terms" equivalents
    #[serde(default)]
    pub examples: Option<Vec<ExampleTemplate>>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            job_cost_usd: Some(DEFAULT_JOB_COST_USD),
            avg_household_size: Some(DEFAULT_AVG_HOUSEHOLD_SIZE),
            stale_after: Some(DEFAULT_STALE_AFTER.to_string()),
            examples: Some(vec![
                ExampleTemplate {
                    label: "Teacher salaries".to_string(),
                    usd_per_unit: 65_000.0,
                    note: Some("one school year, salary + benefits".to_string()),
                },
                ExampleTemplate {
                    label: "Police patrol cars".to_string(),
                    usd_per_unit: 55_000.0,
                    note: Some("fully equipped".to_string()),
                },
                ExampleTemplate {
                    label: "Lane-miles of road repaving".to_string(),
                    usd_per_unit: 150_000.0,
                    note: None,
                },
            ]),
        }
    }
}

impl InsightConfig {
    pub fn job_cost_usd(&self) -> f64 {
        self.job_cost_usd.unwrap_or(DEFAULT_JOB_COST_USD)
    }

    pub fn avg_household_size(&self) -> f64 {
        self.avg_household_size.unwrap_or(DEFAULT_AVG_HOUSEHOLD_SIZE)
    }

    /// Staleness window. An unparseable value falls back to the default;
    /// `validate_insight_config` reports it at startup.
    pub fn stale_after(&self) -> chrono::Duration {
        let parsed = self
            .stale_after
            .as_deref()
            .and_then(|s| humantime::parse_duration(s.trim()).ok())
            .and_then(|d| chrono::Duration::from_std(d).ok());

        parsed.unwrap_or_else(|| chrono::Duration::days(180))
    }

    pub fn examples(&self) -> &[ExampleTemplate] {
        self.examples.as_deref().unwrap_or(&[])
    }
}

/// A real-world equivalent: "N of <label> at <usd_per_unit> each".
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExampleTemplate {
    pub label: String,
    pub usd_per_unit: f64,
    #[serde(default)]
    pub note: Option<String>,
}
