use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

use super::config::InsightConfig;
use super::confidence::score_confidence;
use super::coverage::CoverageDetail;
use super::economics::{derive_jobs_lost, derive_per_capita};
use super::equivalents::normalize_examples;
use super::grade::resolve_grade;
use super::sanitize::Sanitizer;
use super::view::{BudgetYear, TownInsightViewModel};
use crate::error::{FetchFailure, InsightError, RecordKind};
use crate::records::{
    BudgetRecord, CorruptionSummary, DataCoverageStatus, MunicipalityProfile, SourceCitation,
    TransparencyScoreRecord,
};
use crate::source::RecordProvider;

/// Fully-resolved raw records for one municipality.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightInputs {
    pub profile: MunicipalityProfile,
    pub transparency_score: Option<TransparencyScoreRecord>,
    pub corruption: Option<CorruptionSummary>,
    /// Any order; the builder sorts by year
    pub budgets: Vec<BudgetRecord>,
    pub coverage: Option<DataCoverageStatus>,
}

impl InsightInputs {
    pub fn new(profile: MunicipalityProfile) -> Self {
        Self {
            profile,
            transparency_score: None,
            corruption: None,
            budgets: Vec::new(),
            coverage: None,
        }
    }

    /// A report exists once there is a score record or a corruption summary
    pub fn has_report(&self) -> bool {
        self.transparency_score.is_some() || self.corruption.is_some()
    }
}

/// Fetch every record for `identifier`, then build its insight.
pub async fn aggregate_insight(
    provider: &dyn RecordProvider,
    identifier: &str,
    as_of: NaiveDate,
    config: &InsightConfig,
) -> Result<TownInsightViewModel, InsightError> {
    let inputs = fetch_inputs(provider, identifier).await?;
    build_insight(&inputs, as_of, config)
}

/// Resolve the municipality, then fetch its four record sets concurrently.
///
/// Every failed fetch is reported, not only the first one to complete.
pub async fn fetch_inputs(
    provider: &dyn RecordProvider,
    identifier: &str,
) -> Result<InsightInputs, InsightError> {
    debug!(identifier, "resolving municipality");

    let profile = provider
        .municipality(identifier)
        .await
        .map_err(|e| InsightError::Upstream(vec![FetchFailure::new(RecordKind::Municipality, e)]))?
        .ok_or_else(|| InsightError::NotFound(identifier.to_string()))?;

    let id = profile.id.as_str();
    let (score, corruption, budgets, coverage) = futures::join!(
        provider.latest_transparency_score(id),
        provider.corruption_summary(id),
        provider.budget_history(id),
        provider.coverage_status(id),
    );

    let mut failures = Vec::new();
    let transparency_score = collect(score, RecordKind::TransparencyScore, &mut failures);
    let corruption = collect(corruption, RecordKind::CorruptionSummary, &mut failures);
    let budgets = collect(budgets, RecordKind::BudgetHistory, &mut failures);
    let coverage = collect(coverage, RecordKind::CoverageStatus, &mut failures);

    if !failures.is_empty() {
        return Err(InsightError::Upstream(failures));
    }

    debug!(
        identifier,
        has_score = transparency_score.is_some(),
        has_corruption = corruption.is_some(),
        budgets = budgets.len(),
        has_coverage = coverage.is_some(),
        "fetched municipality records"
    );

    Ok(InsightInputs {
        profile,
        transparency_score,
        corruption,
        budgets,
        coverage,
    })
}

fn collect<T: Default>(
    result: anyhow::Result<T>,
    kind: RecordKind,
    failures: &mut Vec<FetchFailure>,
) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            failures.push(FetchFailure::new(kind, error));
            T::default()
        }
    }
}

/// Fuse already-fetched records into the view model.
///
/// Pure: identical inputs give identical output. `as_of` is the only date used.
pub fn build_insight(
    inputs: &InsightInputs,
    as_of: NaiveDate,
    config: &InsightConfig,
) -> Result<TownInsightViewModel, InsightError> {
    let profile = &inputs.profile;
    if !inputs.has_report() {
        return Err(InsightError::NoInsightYet(profile.slug.clone()));
    }

    let mut sanitizer = Sanitizer::new();
    let population = sanitizer.population(profile.population);

    // Transparency score and grade
    let score_record = inputs.transparency_score.as_ref();
    let transparency_score = score_record.and_then(|r| sanitizer.score(r.score));
    let transparency_grade =
        score_record.and_then(|r| resolve_grade(r.grade.as_deref(), transparency_score));

    // Corruption figures; a supplied jobs estimate wins over the derived one
    let corruption = inputs.corruption.as_ref();
    let money_lost_usd = corruption
        .and_then(|c| sanitizer.amount("corruption", "total_lost_usd", c.total_lost_usd));
    let money_recovered_usd = corruption.and_then(|c| {
        sanitizer.optional_amount("corruption", "total_recovered_usd", c.total_recovered_usd)
    });
    let supplied_jobs = corruption.and_then(|c| {
        sanitizer.optional_amount("corruption", "estimated_jobs_lost", c.estimated_jobs_lost)
    });
    // An unusable lost amount leaves jobs unknown rather than zero
    let jobs_lost = match (supplied_jobs, money_lost_usd) {
        (Some(jobs), _) => Some(jobs),
        (None, Some(_)) => Some(derive_jobs_lost(money_lost_usd, config.job_cost_usd())),
        (None, None) => None,
    };

    // Budgets, latest = max year
    let mut budget_history: Vec<BudgetYear> = inputs
        .budgets
        .iter()
        .map(|b| BudgetYear {
            year: b.year,
            total_budget_usd: sanitizer.amount("budget", "total_budget_usd", b.total_budget_usd),
            source_url: b.source_url.clone(),
        })
        .collect();
    budget_history.sort_by_key(|b| b.year);
    let latest_budget = budget_history.last().cloned();

    let per_capita = derive_per_capita(money_lost_usd, population, config.avg_household_size());

    let confidence = score_confidence(inputs.coverage.as_ref());
    let coverage = inputs
        .coverage
        .as_ref()
        .map(|status| {
            CoverageDetail::from_status(status, as_of, config.stale_after(), &mut sanitizer)
        });

    let real_world_examples = money_lost_usd
        .map(|amount| normalize_examples(config.examples(), amount))
        .unwrap_or_default();

    let sources = collect_sources(score_record, corruption, latest_budget.as_ref());

    let data_warnings = sanitizer
        .into_invalid()
        .iter()
        .map(|invalid| invalid.to_string())
        .collect();

    Ok(TownInsightViewModel {
        municipality_id: profile.id.clone(),
        slug: profile.slug.clone(),
        name: profile.name.clone(),
        county: profile.county.clone(),
        population,
        as_of,
        transparency_score_year: score_record.map(|r| r.score_year),
        transparency_score,
        transparency_grade,
        money_lost_usd,
        money_recovered_usd,
        jobs_lost,
        per_household_usd: per_capita.per_household,
        per_resident_usd: per_capita.per_resident,
        latest_budget_year: latest_budget.as_ref().map(|b| b.year),
        latest_budget_usd: latest_budget.as_ref().and_then(|b| b.total_budget_usd),
        latest_budget_source_url: latest_budget.and_then(|b| b.source_url),
        budget_history,
        confidence,
        coverage,
        real_world_examples,
        sources,
        data_warnings,
    })
}

/// Citations from the score review, corruption cases and latest budget,
/// deduplicated by URL keeping the first occurrence.
fn collect_sources(
    score: Option<&TransparencyScoreRecord>,
    corruption: Option<&CorruptionSummary>,
    latest_budget: Option<&BudgetYear>,
) -> Vec<SourceCitation> {
    let mut candidates = Vec::new();

    if let Some(record) = score {
        if let Some(url) = &record.source_url {
            candidates.push(SourceCitation {
                title: format!("{} transparency review", record.score_year),
                url: url.clone(),
                kind: "transparency".to_string(),
            });
        }
    }

    if let Some(summary) = corruption {
        candidates.extend(summary.sources.iter().cloned());
    }

    if let Some(budget) = latest_budget {
        if let Some(url) = &budget.source_url {
            candidates.push(SourceCitation {
                title: format!("{} municipal budget", budget.year),
                url: url.clone(),
                kind: "budget".to_string(),
            });
        }
    }

    let mut seen_urls = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.url.trim().is_empty())
        .filter(|c| seen_urls.insert(c.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::confidence::Confidence;
    use crate::insight::economics::LocalCost;
    use crate::source::{MemoryProvider, TownDataset};
    use chrono::{TimeZone, Utc};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn profile(population: Option<i64>) -> MunicipalityProfile {
        MunicipalityProfile {
            id: "m-np".to_string(),
            slug: "new-providence".to_string(),
            name: "New Providence".to_string(),
            county: Some("Union".to_string()),
            state: Some("NJ".to_string()),
            website_url: None,
            population,
        }
    }

    fn corruption(lost: f64) -> CorruptionSummary {
        CorruptionSummary {
            total_lost_usd: lost,
            total_recovered_usd: Some(300_000.0),
            estimated_jobs_lost: None,
            sources: Vec::new(),
        }
    }

    fn score(value: f64, grade: Option<&str>) -> TransparencyScoreRecord {
        TransparencyScoreRecord {
            score_year: 2024,
            score: value,
            grade: grade.map(str::to_string),
            source_url: None,
        }
    }

    fn budget(year: i32, amount: f64, url: Option<&str>) -> BudgetRecord {
        BudgetRecord {
            year,
            total_budget_usd: amount,
            source_url: url.map(str::to_string),
        }
    }

    fn full_coverage() -> DataCoverageStatus {
        DataCoverageStatus {
            last_updated_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            has_meetings: true,
            has_meeting_documents: true,
            has_contracts: true,
            has_opra_metrics: true,
            has_audit_data: true,
            has_population: true,
            sources_count: 6,
            metrics_filled_count: 12,
            metrics_total_count: 12,
            missing: Vec::new(),
        }
    }

    fn inputs() -> InsightInputs {
        InsightInputs {
            profile: profile(Some(13_000)),
            transparency_score: Some(score(84.0, None)),
            corruption: Some(corruption(1_200_000.0)),
            budgets: vec![
                budget(2022, 22_000_000.0, None),
                budget(2024, 25_000_000.0, Some("https://example.org/np-2024.pdf")),
                budget(2023, 23_500_000.0, None),
            ],
            coverage: Some(full_coverage()),
        }
    }

    fn dataset(inputs: &InsightInputs) -> TownDataset {
        TownDataset {
            profile: inputs.profile.clone(),
            budgets: inputs.budgets.clone(),
            corruption: inputs.corruption.clone(),
            transparency_scores: inputs.transparency_score.iter().cloned().collect(),
            coverage: inputs.coverage.clone(),
        }
    }

    #[test]
    fn test_build_full_insight() {
        let view = build_insight(&inputs(), as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.name, "New Providence");
        assert_eq!(view.as_of, as_of());
        assert_eq!(view.transparency_score, Some(84.0));
        assert_eq!(view.transparency_grade.as_deref(), Some("B"));
        assert_eq!(view.money_lost_usd, Some(1_200_000.0));
        assert_eq!(view.money_recovered_usd, Some(300_000.0));
        assert_eq!(view.jobs_lost, Some(10.0));
        assert_eq!(view.per_resident_usd, Some(1_200_000.0 / 13_000.0));
        assert!(matches!(view.local_cost(), Some(LocalCost::PerHousehold(_))));
        assert_eq!(view.confidence, Confidence::High);
        assert_eq!(view.coverage.as_ref().unwrap().points, 8);
        assert_eq!(view.real_world_examples.len(), 3);
        assert!(view.data_warnings.is_empty());
    }

    #[test]
    fn test_latest_budget_is_max_year_not_last_listed() {
        let view = build_insight(&inputs(), as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.latest_budget_year, Some(2024));
        assert_eq!(view.latest_budget_usd, Some(25_000_000.0));
        assert_eq!(
            view.latest_budget_source_url.as_deref(),
            Some("https://example.org/np-2024.pdf")
        );
        let years: Vec<_> = view.budget_history.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![2022, 2023, 2024]);
    }

    #[test]
    fn test_empty_budget_history_is_null_not_zero() {
        let mut inputs = inputs();
        inputs.budgets.clear();
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.latest_budget_year, None);
        assert_eq!(view.latest_budget_usd, None);
        assert_eq!(view.latest_budget_source_url, None);
        assert!(view.budget_history.is_empty());
    }

    #[test]
    fn test_supplied_values_override_derived() {
        let mut inputs = inputs();
        inputs.transparency_score = Some(score(84.0, Some("A")));
        inputs.corruption.as_mut().unwrap().estimated_jobs_lost = Some(15.0);
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.transparency_grade.as_deref(), Some("A"));
        assert_eq!(view.jobs_lost, Some(15.0));
    }

    #[test]
    fn test_non_finite_supplied_jobs_falls_back_to_derived() {
        let mut inputs = inputs();
        inputs.corruption.as_mut().unwrap().estimated_jobs_lost = Some(f64::NAN);
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.jobs_lost, Some(10.0));
        assert_eq!(view.data_warnings.len(), 1);
    }

    #[test]
    fn test_missing_score_record_means_no_grade() {
        let mut inputs = inputs();
        inputs.transparency_score = None;
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.transparency_score, None);
        assert_eq!(view.transparency_grade, None);
        assert_eq!(view.transparency_score_year, None);
    }

    #[test]
    fn test_missing_corruption_keeps_money_fields_null() {
        let mut inputs = inputs();
        inputs.corruption = None;
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.money_lost_usd, None);
        assert_eq!(view.jobs_lost, None);
        assert_eq!(view.per_household_usd, None);
        assert!(view.real_world_examples.is_empty());
    }

    #[test]
    fn test_unreported_recovery_stays_null() {
        let mut inputs = inputs();
        inputs.corruption.as_mut().unwrap().total_recovered_usd = None;
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.money_lost_usd, Some(1_200_000.0));
        assert_eq!(view.money_recovered_usd, None);
        assert!(view.data_warnings.is_empty());
    }

    #[test]
    fn test_invalid_lost_amount_leaves_jobs_unknown() {
        let mut inputs = inputs();
        inputs.corruption.as_mut().unwrap().total_lost_usd = -10.0;
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.money_lost_usd, None);
        assert_eq!(view.jobs_lost, None);
        assert!(view.real_world_examples.is_empty());
        assert_eq!(
            view.data_warnings,
            vec!["corruption.total_lost_usd: negative amount -10"]
        );
    }

    #[test]
    fn test_negative_source_count_degrades_coverage() {
        let mut inputs = inputs();
        inputs.coverage.as_mut().unwrap().sources_count = -1;
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        let coverage = view.coverage.as_ref().unwrap();
        assert_eq!(coverage.sources_count, None);
        assert_eq!(coverage.points, 6);
        assert_eq!(view.confidence, Confidence::Medium);
        assert_eq!(
            view.data_warnings,
            vec!["coverage.sources_count: negative count -1"]
        );
    }

    #[test]
    fn test_zero_loss_is_known_zero() {
        let mut inputs = inputs();
        inputs.corruption = Some(corruption(0.0));
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.money_lost_usd, Some(0.0));
        assert_eq!(view.jobs_lost, Some(0.0));
        assert_eq!(view.local_cost(), None);
    }

    #[test]
    fn test_negative_population_is_logged_and_dropped() {
        let mut inputs = inputs();
        inputs.profile.population = Some(-5);
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.population, None);
        assert_eq!(view.per_household_usd, None);
        assert_eq!(view.per_resident_usd, None);
        assert_eq!(view.data_warnings, vec!["municipality.population: negative value -5"]);
    }

    #[test]
    fn test_out_of_range_score_keeps_supplied_grade() {
        let mut inputs = inputs();
        inputs.transparency_score = Some(score(140.0, Some("B-")));
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.transparency_score, None);
        assert_eq!(view.transparency_grade.as_deref(), Some("B-"));
        assert_eq!(view.transparency_score_year, Some(2024));
    }

    #[test]
    fn test_absent_coverage_is_low_confidence() {
        let mut inputs = inputs();
        inputs.coverage = None;
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        assert_eq!(view.confidence, Confidence::Low);
        assert!(view.coverage.is_none());
    }

    #[test]
    fn test_no_report_content_is_no_insight_yet() {
        let inputs = InsightInputs::new(profile(Some(13_000)));
        let err = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap_err();
        assert!(matches!(err, InsightError::NoInsightYet(slug) if slug == "new-providence"));
    }

    #[test]
    fn test_sources_deduplicated_by_url() {
        let mut inputs = inputs();
        inputs.transparency_score.as_mut().unwrap().source_url =
            Some("https://example.org/review".to_string());
        inputs.corruption.as_mut().unwrap().sources = vec![
            SourceCitation {
                title: "Comptroller report".to_string(),
                url: "https://example.org/comptroller".to_string(),
                kind: "audit".to_string(),
            },
            SourceCitation {
                title: "Same review, linked again".to_string(),
                url: "https://example.org/review".to_string(),
                kind: "news".to_string(),
            },
        ];
        let view = build_insight(&inputs, as_of(), &InsightConfig::default()).unwrap();

        let urls: Vec<_> = view.sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.org/review",
                "https://example.org/comptroller",
                "https://example.org/np-2024.pdf",
            ]
        );
        assert_eq!(view.sources[0].title, "2024 transparency review");
    }

    #[test]
    fn test_build_is_idempotent() {
        let config = InsightConfig::default();
        let first = build_insight(&inputs(), as_of(), &config).unwrap();
        let second = build_insight(&inputs(), as_of(), &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_aggregate_unknown_identifier_is_not_found() {
        let provider = MemoryProvider::new().with_town(dataset(&inputs()));
        let err = aggregate_insight(&provider, "atlantis", as_of(), &InsightConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::NotFound(id) if id == "atlantis"));
    }

    #[tokio::test]
    async fn test_aggregate_through_provider() {
        let provider = MemoryProvider::new().with_town(dataset(&inputs()));
        let view = aggregate_insight(&provider, "new-providence", as_of(), &InsightConfig::default())
            .await
            .unwrap();

        let direct = build_insight(&inputs(), as_of(), &InsightConfig::default()).unwrap();
        assert_eq!(view, direct);
    }

    #[tokio::test]
    async fn test_aggregate_reports_every_failure() {
        let provider = MemoryProvider::new()
            .with_town(dataset(&inputs()))
            .with_failure(RecordKind::BudgetHistory, "budget table unavailable")
            .with_failure(RecordKind::CoverageStatus, "status view timed out");

        let err = aggregate_insight(&provider, "new-providence", as_of(), &InsightConfig::default())
            .await
            .unwrap_err();

        let kinds: Vec<_> = err.failures().iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![RecordKind::BudgetHistory, RecordKind::CoverageStatus]);
        assert!(err.to_string().contains("budget table unavailable"));
        assert!(err.to_string().contains("status view timed out"));
    }

    #[tokio::test]
    async fn test_aggregate_profile_failure_is_upstream_not_not_found() {
        let provider = MemoryProvider::new()
            .with_town(dataset(&inputs()))
            .with_failure(RecordKind::Municipality, "connection refused");

        let err = aggregate_insight(&provider, "new-providence", as_of(), &InsightConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, InsightError::Upstream(_)));
        assert_eq!(err.failures()[0].kind, RecordKind::Municipality);
    }

    #[tokio::test]
    async fn test_aggregate_town_without_report() {
        let provider = MemoryProvider::new().with_town(TownDataset::new(profile(Some(9_000))));
        let err = aggregate_insight(&provider, "new-providence", as_of(), &InsightConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::NoInsightYet(_)));
    }
}
