pub mod aggregator;
pub mod confidence;
pub mod config;
pub mod coverage;
pub mod economics;
pub mod equivalents;
pub mod grade;
pub mod listing;
pub mod sanitize;
pub mod validation;
pub mod view;

pub use aggregator::{aggregate_insight, build_insight, fetch_inputs, InsightInputs};
pub use confidence::{confidence_points, score_confidence, Confidence};
pub use config::*;
pub use coverage::{pretty_missing, CoverageDetail};
pub use economics::{derive_jobs_lost, derive_per_capita, LocalCost, PerCapita};
pub use equivalents::{normalize_examples, RealWorldExample};
pub use grade::{resolve_grade, score_to_grade, Grade};
pub use listing::{list_towns, ReportStatus, TownListing};
pub use validation::validate_insight_config;
pub use view::{BudgetYear, TownInsightViewModel};
