use std::fmt;
use thiserror::Error;

/// The record a collaborator fetch was trying to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Municipality,
    TransparencyScore,
    CorruptionSummary,
    BudgetHistory,
    CoverageStatus,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Municipality => "municipality",
            RecordKind::TransparencyScore => "transparency score",
            RecordKind::CorruptionSummary => "corruption summary",
            RecordKind::BudgetHistory => "budget history",
            RecordKind::CoverageStatus => "coverage status",
        };
        f.write_str(name)
    }
}

/// One failed collaborator fetch. The provider's error is kept as-is.
#[derive(Debug)]
pub struct FetchFailure {
    pub kind: RecordKind,
    pub error: anyhow::Error,
}

impl FetchFailure {
    pub fn new(kind: RecordKind, error: anyhow::Error) -> Self {
        Self { kind, error }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fetch failed: {:#}", self.kind, self.error)
    }
}

/// Why a town insight could not be produced.
///
/// `NotFound` and `NoInsightYet` are expected outcomes the presentation layer
/// renders differently; `Upstream` means a collaborator actually failed.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("municipality not found: {0}")]
    NotFound(String),

    #[error("no insight has been computed yet for {0}")]
    NoInsightYet(String),

    #[error("{}", join_failures(.0))]
    Upstream(Vec<FetchFailure>),
}

impl InsightError {
    /// Failures carried by an `Upstream` error, empty otherwise
    pub fn failures(&self) -> &[FetchFailure] {
        match self {
            InsightError::Upstream(failures) => failures,
            _ => &[],
        }
    }
}

fn join_failures(failures: &[FetchFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
