use serde::{Deserialize, Serialize};
use tracing::warn;

use super::config::ExampleTemplate;
use super::economics::round_one_decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealWorldExample {
    pub label: String,
    pub usd_per_unit: f64,
    pub equivalent_units: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Express `total_usd` as a count of each template's unit, to one decimal.
///
/// Templates with a non-positive or non-finite unit cost are dropped, as are
/// those whose unit count would not be finite.
pub fn normalize_examples(templates: &[ExampleTemplate], total_usd: f64) -> Vec<RealWorldExample> {
    templates
        .iter()
        .filter_map(|template| {
            if !template.usd_per_unit.is_finite() || template.usd_per_unit <= 0.0 {
                warn!(
                    label = %template.label,
                    usd_per_unit = template.usd_per_unit,
                    "dropping example with non-positive unit cost"
                );
                return None;
            }

            let equivalent_units = round_one_decimal(total_usd / template.usd_per_unit);
            if !equivalent_units.is_finite() {
                warn!(
                    label = %template.label,
                    usd_per_unit = template.usd_per_unit,
                    "dropping example with unbounded unit count"
                );
                return None;
            }

            Some(RealWorldExample {
                label: template.label.clone(),
                usd_per_unit: template.usd_per_unit,
                equivalent_units,
                note: template.note.clone(),
            })
        })
        .collect()
}
