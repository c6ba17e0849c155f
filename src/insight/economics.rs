use serde::{Deserialize, Serialize};

/// Round to one decimal place, the precision all equivalents are shown at.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convert a dollar loss into notional local jobs.
///
/// Zero, absent, negative or non-finite amounts yield `0.0`. A non-positive
/// job cost, or one so small the count overflows, also yields `0.0`.
pub fn derive_jobs_lost(amount_lost_usd: Option<f64>, job_cost_usd: f64) -> f64 {
    let amount = match amount_lost_usd {
        Some(a) if a.is_finite() && a > 0.0 => a,
        _ => return 0.0,
    };
    if !job_cost_usd.is_finite() || job_cost_usd <= 0.0 {
        return 0.0;
    }
    finite(round_one_decimal(amount / job_cost_usd)).unwrap_or(0.0)
}

/// Loss spread across residents and estimated households.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerCapita {
    pub per_household: Option<f64>,
    pub per_resident: Option<f64>,
}

/// The single framing the presentation layer should lead with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", content = "usd", rename_all = "snake_case")]
pub enum LocalCost {
    PerHousehold(f64),
    PerResident(f64),
}

impl PerCapita {
    /// Per-household wins; per-resident only when households can't be estimated
    pub fn preferred(&self) -> Option<LocalCost> {
        self.per_household
            .map(LocalCost::PerHousehold)
            .or(self.per_resident.map(LocalCost::PerResident))
    }
}

/// Spread `amount_lost_usd` across `population` and its estimated households.
///
/// Both figures are `None` when the amount is not positive or the population
/// is absent or zero; a population is never fabricated.
pub fn derive_per_capita(
    amount_lost_usd: Option<f64>,
    population: Option<u64>,
    avg_household_size: f64,
) -> PerCapita {
    let amount = match amount_lost_usd {
        Some(a) if a.is_finite() && a > 0.0 => a,
        _ => return PerCapita::default(),
    };
    let population = match population {
        Some(p) if p > 0 => p as f64,
        _ => return PerCapita::default(),
    };

    let per_resident = finite(amount / population);

    let households = population / avg_household_size;
    let per_household = if households.is_finite() && households > 0.0 {
        finite(amount / households)
    } else {
        None
    };

    PerCapita {
        per_household,
        per_resident,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
