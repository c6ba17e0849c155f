use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{RecordProvider, TownDataset};
use crate::records::{
    BudgetRecord, CorruptionSummary, DataCoverageStatus, MunicipalityProfile,
    TransparencyScoreRecord,
};

/// Just the profile of a dataset file; the other keys are not parsed.
#[derive(Deserialize)]
struct ProfileHeader {
    profile: MunicipalityProfile,
}

/// Reads one `<slug>.json` dataset per municipality from a directory.
///
/// A missing file means "not found"; an unreadable or malformed file is an
/// error for that town only. Other towns' files are never parsed to answer a
/// per-town fetch once the town's file is known.
#[derive(Debug, Clone)]
pub struct FileProvider {
    data_dir: PathBuf,
    /// municipality id -> dataset file, filled as profiles are read
    paths: Arc<Mutex<HashMap<String, PathBuf>>>,
}

impl FileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            paths: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn dataset_path(&self, slug: &str) -> Option<PathBuf> {
        // Slugs name files directly; anything path-like can't match one
        if slug.is_empty() || slug.contains('/') || slug.contains('\\') || slug.starts_with('.') {
            return None;
        }
        Some(self.data_dir.join(format!("{}.json", slug)))
    }

    async fn read(path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dataset at {}", path.display()))
    }

    async fn load_dataset(path: &Path) -> Result<TownDataset> {
        let content = Self::read(path).await?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset: invalid JSON in {}", path.display()))
    }

    async fn load_profile(path: &Path) -> Result<MunicipalityProfile> {
        let content = Self::read(path).await?;
        let header: ProfileHeader = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset: invalid JSON in {}", path.display()))?;
        Ok(header.profile)
    }

    async fn remember(&self, municipality_id: &str, path: &Path) {
        self.paths
            .lock()
            .await
            .insert(municipality_id.to_string(), path.to_path_buf());
    }

    /// `*.json` files in the data directory, ordered by file name
    async fn dataset_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .with_context(|| format!("Failed to open data directory at {}", self.data_dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Find the file holding `municipality_id`, scanning profiles when it is
    /// not already known. Files that fail to parse belong to other towns and
    /// are skipped.
    async fn path_for_id(&self, municipality_id: &str) -> Result<Option<PathBuf>> {
        if let Some(path) = self.paths.lock().await.get(municipality_id).cloned() {
            return Ok(Some(path));
        }

        for path in self.dataset_files().await? {
            match Self::load_profile(&path).await {
                Ok(profile) => {
                    self.remember(&profile.id, &path).await;
                    if profile.id == municipality_id {
                        return Ok(Some(path));
                    }
                }
                Err(e) => {
                    let error = format!("{:#}", e);
                    debug!(path = %path.display(), %error, "skipping unreadable dataset");
                }
            }
        }
        Ok(None)
    }

    async fn find_by_id(&self, municipality_id: &str) -> Result<Option<TownDataset>> {
        let Some(path) = self.path_for_id(municipality_id).await? else {
            return Ok(None);
        };
        let dataset = Self::load_dataset(&path).await?;
        Ok((dataset.profile.id == municipality_id).then_some(dataset))
    }
}

#[async_trait]
impl RecordProvider for FileProvider {
    async fn municipality(&self, identifier: &str) -> Result<Option<MunicipalityProfile>> {
        let Some(path) = self.dataset_path(identifier) else {
            return Ok(None);
        };

        if !tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check dataset at {}", path.display()))?
        {
            debug!(path = %path.display(), "no dataset for identifier");
            return Ok(None);
        }

        let dataset = Self::load_dataset(&path).await?;
        self.remember(&dataset.profile.id, &path).await;
        Ok(Some(dataset.profile))
    }

    async fn latest_transparency_score(
        &self,
        municipality_id: &str,
    ) -> Result<Option<TransparencyScoreRecord>> {
        let dataset = self.find_by_id(municipality_id).await?;
        Ok(dataset.and_then(|d| d.latest_transparency_score().cloned()))
    }

    async fn corruption_summary(&self, municipality_id: &str) -> Result<Option<CorruptionSummary>> {
        let dataset = self.find_by_id(municipality_id).await?;
        Ok(dataset.and_then(|d| d.corruption))
    }

    async fn budget_history(&self, municipality_id: &str) -> Result<Vec<BudgetRecord>> {
        let dataset = self.find_by_id(municipality_id).await?;
        Ok(dataset.map(|d| d.budgets).unwrap_or_default())
    }

    async fn coverage_status(&self, municipality_id: &str) -> Result<Option<DataCoverageStatus>> {
        let dataset = self.find_by_id(municipality_id).await?;
        Ok(dataset.and_then(|d| d.coverage))
    }

    /// Profiles of every readable dataset. A file whose profile can't be
    /// parsed is logged and left out so one bad file doesn't hide every town.
    async fn list_municipalities(&self) -> Result<Vec<MunicipalityProfile>> {
        let mut profiles = Vec::new();
        for path in self.dataset_files().await? {
            match Self::load_profile(&path).await {
                Ok(profile) => {
                    self.remember(&profile.id, &path).await;
                    profiles.push(profile);
                }
                Err(e) => {
                    let error = format!("{:#}", e);
                    warn!(path = %path.display(), %error, "skipping unreadable dataset");
                }
            }
        }
        Ok(profiles)
    }
}
