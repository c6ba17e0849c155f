use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use super::aggregator::aggregate_insight;
use super::config::InsightConfig;
use super::confidence::Confidence;
use crate::error::InsightError;
use crate::records::MunicipalityProfile;
use crate::source::RecordProvider;

/// Whether a town has a report, for "report available" badges.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Ready {
        grade: Option<String>,
        confidence: Confidence,
    },
    NotYet,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TownListing {
    pub profile: MunicipalityProfile,
    pub status: ReportStatus,
}

/// Build every listed town's insight concurrently and summarize each one.
///
/// A failure for one town is recorded on that town and the rest continue;
/// only a failure to list municipalities at all is an error. Sorted by name.
pub async fn list_towns(
    provider: &dyn RecordProvider,
    as_of: NaiveDate,
    config: &InsightConfig,
) -> Result<Vec<TownListing>> {
    let profiles = provider
        .list_municipalities()
        .await
        .context("Failed to list municipalities")?;

    let mut futures = FuturesUnordered::new();
    for profile in profiles {
        futures.push(async move {
            let result = aggregate_insight(provider, &profile.slug, as_of, config).await;
            (profile, result)
        });
    }

    let mut listings = Vec::new();
    while let Some((profile, result)) = futures.next().await {
        let status = match result {
            Ok(view) => ReportStatus::Ready {
                grade: view.transparency_grade,
                confidence: view.confidence,
            },
            Err(InsightError::NoInsightYet(_)) => ReportStatus::NotYet,
            Err(e) => {
                warn!(slug = %profile.slug, error = %e, "failed to build town insight");
                ReportStatus::Failed(e.to_string())
            }
        };
        listings.push(TownListing { profile, status });
    }

    debug!(towns = listings.len(), "listed towns");

    listings.sort_by(|a, b| {
        a.profile
            .name
            .cmp(&b.profile.name)
            .then_with(|| a.profile.slug.cmp(&b.profile.slug))
    });
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordKind;
    use crate::records::{CorruptionSummary, TransparencyScoreRecord};
    use crate::source::{MemoryProvider, TownDataset};

    fn town(slug: &str, name: &str) -> TownDataset {
        TownDataset::new(MunicipalityProfile {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            name: name.to_string(),
            county: Some("Union".to_string()),
            state: None,
            website_url: None,
            population: Some(10_000),
        })
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[tokio::test]
    async fn test_list_marks_report_availability() {
        let mut westfield = town("westfield", "Westfield");
        westfield.transparency_scores.push(TransparencyScoreRecord {
            score_year: 2024,
            score: 91.0,
            grade: None,
            source_url: None,
        });
        let mut cranford = town("cranford", "Cranford");
        cranford.corruption = Some(CorruptionSummary {
            total_lost_usd: 50_000.0,
            total_recovered_usd: None,
            estimated_jobs_lost: None,
            sources: Vec::new(),
        });

        let provider = MemoryProvider::new()
            .with_town(westfield)
            .with_town(cranford)
            .with_town(town("garwood", "Garwood"));

        let listings = list_towns(&provider, as_of(), &InsightConfig::default())
            .await
            .unwrap();

        let names: Vec<_> = listings.iter().map(|l| l.profile.name.as_str()).collect();
        assert_eq!(names, vec!["Cranford", "Garwood", "Westfield"]);

        assert_eq!(
            listings[0].status,
            ReportStatus::Ready {
                grade: None,
                confidence: Confidence::Low
            }
        );
        assert_eq!(listings[1].status, ReportStatus::NotYet);
        assert_eq!(
            listings[2].status,
            ReportStatus::Ready {
                grade: Some("A-".to_string()),
                confidence: Confidence::Low
            }
        );
    }

    #[tokio::test]
    async fn test_per_town_failure_does_not_abort_list() {
        let provider = MemoryProvider::new()
            .with_town(town("garwood", "Garwood"))
            .with_failure(RecordKind::CorruptionSummary, "view missing");

        let listings = list_towns(&provider, as_of(), &InsightConfig::default())
            .await
            .unwrap();

        assert_eq!(listings.len(), 1);
        assert!(matches!(&listings[0].status, ReportStatus::Failed(msg) if msg.contains("view missing")));
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let provider = MemoryProvider::new().with_failure(RecordKind::Municipality, "down");
        assert!(list_towns(&provider, as_of(), &InsightConfig::default())
            .await
            .is_err());
    }
}
