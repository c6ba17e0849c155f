use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::coverage::CoverageDetail;
use super::economics::{LocalCost, PerCapita};
use super::equivalents::RealWorldExample;
use crate::records::SourceCitation;

/// One fiscal year of the budget history. `None` means the amount was unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetYear {
    pub year: i32,
    pub total_budget_usd: Option<f64>,
    pub source_url: Option<String>,
}

/// The fused report for one municipality on one reporting date.
///
/// `None` always means "no data"; a known zero is `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownInsightViewModel {
    pub municipality_id: String,
    pub slug: String,
    pub name: String,
    pub county: Option<String>,
    pub population: Option<u64>,
    pub as_of: NaiveDate,

    pub transparency_score_year: Option<i32>,
    pub transparency_score: Option<f64>,
    pub transparency_grade: Option<String>,

    pub money_lost_usd: Option<f64>,
    pub money_recovered_usd: Option<f64>,
    pub jobs_lost: Option<f64>,
    pub per_household_usd: Option<f64>,
    pub per_resident_usd: Option<f64>,

    pub latest_budget_year: Option<i32>,
    pub latest_budget_usd: Option<f64>,
    pub latest_budget_source_url: Option<String>,
    /// Sorted by year, ascending
    pub budget_history: Vec<BudgetYear>,

    pub confidence: Confidence,
    pub coverage: Option<CoverageDetail>,

    pub real_world_examples: Vec<RealWorldExample>,
    pub sources: Vec<SourceCitation>,

    /// Raw fields that were malformed and left out of the derivations
    pub data_warnings: Vec<String>,
}

impl TownInsightViewModel {
    /// Preferred "what this means locally" figure, if any
    pub fn local_cost(&self) -> Option<LocalCost> {
        PerCapita {
            per_household: self.per_household_usd,
            per_resident: self.per_resident_usd,
        }
        .preferred()
    }
}
