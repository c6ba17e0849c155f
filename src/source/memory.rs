use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use super::{RecordProvider, TownDataset};
use crate::error::RecordKind;
use crate::records::{
    BudgetRecord, CorruptionSummary, DataCoverageStatus, MunicipalityProfile,
    TransparencyScoreRecord,
};

/// In-memory provider keyed by slug, with optional injected failures.
///
/// Useful for embedding the aggregator where records are already loaded, and
/// for exercising failure paths deterministically.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    towns: HashMap<String, TownDataset>,
    failures: HashMap<RecordKind, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_town(mut self, dataset: TownDataset) -> Self {
        self.insert(dataset);
        self
    }

    pub fn insert(&mut self, dataset: TownDataset) {
        self.towns.insert(dataset.profile.slug.clone(), dataset);
    }

    /// Make every fetch of `kind` fail with `message`
    pub fn with_failure(mut self, kind: RecordKind, message: impl Into<String>) -> Self {
        self.failures.insert(kind, message.into());
        self
    }

    fn check(&self, kind: RecordKind) -> Result<()> {
        match self.failures.get(&kind) {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    fn by_id(&self, municipality_id: &str) -> Option<&TownDataset> {
        self.towns
            .values()
            .find(|d| d.profile.id == municipality_id)
    }
}

#[async_trait]
impl RecordProvider for MemoryProvider {
    async fn municipality(&self, identifier: &str) -> Result<Option<MunicipalityProfile>> {
        self.check(RecordKind::Municipality)?;
        Ok(self.towns.get(identifier).map(|d| d.profile.clone()))
    }

    async fn latest_transparency_score(
        &self,
        municipality_id: &str,
    ) -> Result<Option<TransparencyScoreRecord>> {
        self.check(RecordKind::TransparencyScore)?;
        Ok(self
            .by_id(municipality_id)
            .and_then(|d| d.latest_transparency_score().cloned()))
    }

    async fn corruption_summary(&self, municipality_id: &str) -> Result<Option<CorruptionSummary>> {
        self.check(RecordKind::CorruptionSummary)?;
        Ok(self.by_id(municipality_id).and_then(|d| d.corruption.clone()))
    }

    async fn budget_history(&self, municipality_id: &str) -> Result<Vec<BudgetRecord>> {
        self.check(RecordKind::BudgetHistory)?;
        Ok(self
            .by_id(municipality_id)
            .map(|d| d.budgets.clone())
            .unwrap_or_default())
    }

    async fn coverage_status(&self, municipality_id: &str) -> Result<Option<DataCoverageStatus>> {
        self.check(RecordKind::CoverageStatus)?;
        Ok(self.by_id(municipality_id).and_then(|d| d.coverage.clone()))
    }

    async fn list_municipalities(&self) -> Result<Vec<MunicipalityProfile>> {
        self.check(RecordKind::Municipality)?;
        let mut profiles: Vec<_> = self.towns.values().map(|d| d.profile.clone()).collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }
}
