pub mod types;

pub use types::{
    BudgetRecord, CorruptionSummary, DataCoverageStatus, MunicipalityProfile, SourceCitation,
    TransparencyScoreRecord,
};
