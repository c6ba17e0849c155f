pub mod file;
pub mod memory;

pub use file::FileProvider;
pub use memory::MemoryProvider;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::records::{
    BudgetRecord, CorruptionSummary, DataCoverageStatus, MunicipalityProfile,
    TransparencyScoreRecord,
};

/// Supplies raw per-municipality records to the aggregator.
///
/// `Ok(None)` / an empty list means "no data"; `Err` means the fetch itself
/// failed. Implementations must keep the two apart.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Look up a municipality by its public identifier (slug)
    async fn municipality(&self, identifier: &str) -> Result<Option<MunicipalityProfile>>;

    async fn latest_transparency_score(
        &self,
        municipality_id: &str,
    ) -> Result<Option<TransparencyScoreRecord>>;

    async fn corruption_summary(&self, municipality_id: &str) -> Result<Option<CorruptionSummary>>;

    /// Budget records in whatever order the store keeps them
    async fn budget_history(&self, municipality_id: &str) -> Result<Vec<BudgetRecord>>;

    async fn coverage_status(&self, municipality_id: &str) -> Result<Option<DataCoverageStatus>>;

    async fn list_municipalities(&self) -> Result<Vec<MunicipalityProfile>>;
}

/// Everything known about one municipality, as stored on disk or in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownDataset {
    pub profile: MunicipalityProfile,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
    #[serde(default)]
    pub corruption: Option<CorruptionSummary>,
    #[serde(default)]
    pub transparency_scores: Vec<TransparencyScoreRecord>,
    #[serde(default)]
    pub coverage: Option<DataCoverageStatus>,
}

impl TownDataset {
    pub fn new(profile: MunicipalityProfile) -> Self {
        Self {
            profile,
            budgets: Vec::new(),
            corruption: None,
            transparency_scores: Vec::new(),
            coverage: None,
        }
    }

    /// The score record with the highest `score_year`
    pub fn latest_transparency_score(&self) -> Option<&TransparencyScoreRecord> {
        self.transparency_scores.iter().max_by_key(|s| s.score_year)
    }
}
