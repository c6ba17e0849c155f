pub mod config;
pub mod error;
pub mod insight;
pub mod output;
pub mod records;
pub mod source;

pub use error::{FetchFailure, InsightError, RecordKind};
pub use insight::{aggregate_insight, build_insight, TownInsightViewModel};
pub use source::{FileProvider, MemoryProvider, RecordProvider};
